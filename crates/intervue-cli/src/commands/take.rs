//! The `intervue take` command: a terminal interview.
//!
//! Stdin lines drive the session. The observer publishes what the engine is
//! waiting for on a watch channel, and each line is mapped onto that prompt:
//! any line starts the interview, a non-empty line answers the open question
//! and any line moves on from feedback. End of input or Ctrl-C while a
//! question is open abandons the interview.

use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::{mpsc, watch};

use intervue_core::engine::{session_channel, InterviewEngine, SessionHandle, SessionObserver};
use intervue_core::error::StoreError;
use intervue_core::evaluator::feedback_band;
use intervue_core::model::{CandidateInfo, Question};
use intervue_core::selector::{QUESTIONS_PER_TIER, SELECTED_QUESTION_COUNT};
use intervue_core::session::{Stage, SubmitOutcome};
use intervue_store::config::{create_store, load_config_from};

/// What the engine expects from the next input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    Instructions,
    Question(usize),
    Feedback,
    Finished,
}

/// Prints session progress to the terminal.
struct ConsoleObserver {
    prompt: watch::Sender<Prompt>,
}

impl SessionObserver for ConsoleObserver {
    fn on_question(&self, index: usize, total: usize, question: &Question, time_limit: u32) {
        println!(
            "\nQuestion {}/{} [{}] ({}s)",
            index + 1,
            total,
            question.difficulty,
            time_limit
        );
        println!("{}", question.text);
        println!("Type your answer on one line and press Enter.");
        self.prompt.send_replace(Prompt::Question(index));
    }

    fn on_tick(&self, _index: usize, remaining: u32) {
        if remaining == 30 || remaining == 10 || (remaining <= 5 && remaining > 0) {
            println!("  {remaining}s left");
        }
    }

    fn on_feedback(&self, outcome: &SubmitOutcome, question: &Question) {
        let answer = &outcome.answer;
        let matched = if answer.matched_keywords.is_empty() {
            "none".to_string()
        } else {
            answer.matched_keywords.join(", ")
        };
        println!(
            "Score: {} / {} ({})",
            answer.score,
            question.max_score,
            feedback_band(answer.score, question.max_score)
        );
        println!(
            "Matched {} of {} keywords: {matched}",
            answer.matched_keywords.len(),
            question.keywords.len()
        );
        println!("Press Enter to continue.");
        self.prompt.send_replace(Prompt::Feedback);
    }

    fn on_complete(&self, final_score: f64) {
        println!("\nInterview complete. Final score: {final_score:.1}");
        self.prompt.send_replace(Prompt::Finished);
    }

    fn on_abandoned(&self, index: usize) {
        println!("\nInterview abandoned during question {}.", index + 1);
        self.prompt.send_replace(Prompt::Finished);
    }

    fn on_store_error(&self, error: &StoreError) {
        eprintln!("Warning: progress could not be saved: {error}");
    }
}

pub async fn execute(
    code: String,
    name: String,
    email: String,
    phone: String,
    time_limit: Option<u32>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let mut engine_config = config.engine_config();
    if let Some(limit) = time_limit {
        anyhow::ensure!(limit > 0, "--time-limit must be at least 1 second");
        engine_config.time_limit_secs = limit;
    }

    let store = create_store(&config).await?;
    let engine = InterviewEngine::new(store, engine_config);
    let info = CandidateInfo::new(name, email, phone);
    let session = engine.register(&code, &info).await?;

    println!("Welcome, {}.", info.name.trim());
    println!(
        "You will answer {SELECTED_QUESTION_COUNT} questions, {QUESTIONS_PER_TIER} per difficulty tier, with {}s each.",
        engine.config().time_limit_secs
    );
    println!("When time runs out your current answer is submitted as it stands.");
    println!("Press Enter to begin.");

    let (prompt_tx, prompt_rx) = watch::channel(Prompt::Instructions);
    let observer = ConsoleObserver { prompt: prompt_tx };
    let (handle, events) = session_channel();

    let run = engine.run(session, events, &observer);
    tokio::pin!(run);
    let input = drive_input(handle, spawn_stdin_reader(), prompt_rx);
    tokio::pin!(input);

    let finished = tokio::select! {
        outcome = &mut run => Some(outcome),
        () = &mut input => None,
    };
    let outcome = match finished {
        Some(outcome) => outcome?,
        None => run.await?,
    };

    if outcome.stage != Stage::Complete && outcome.stage != Stage::Abandoned {
        println!("\nInterview ended before completion ({}).", outcome.stage);
    }
    if outcome.store_failures > 0 {
        eprintln!(
            "Warning: {} store write(s) failed during the interview.",
            outcome.store_failures
        );
    }

    Ok(())
}

/// Read stdin on a plain thread so a pending read never blocks shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Map input lines onto session events until the interview finishes or
/// input runs out.
async fn drive_input(
    handle: SessionHandle,
    mut lines: mpsc::UnboundedReceiver<String>,
    mut prompt: watch::Receiver<Prompt>,
) {
    loop {
        if *prompt.borrow_and_update() == Prompt::Finished {
            return;
        }

        let line = tokio::select! {
            line = lines.recv() => line,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            handle.hidden();
            return;
        };

        let sent = match *prompt.borrow_and_update() {
            Prompt::Instructions => handle.start(),
            Prompt::Question(index) => {
                if line.trim().is_empty() {
                    println!("  (empty answer ignored; type an answer or wait for the timer)");
                    continue;
                }
                handle.submit(index, line)
            }
            Prompt::Feedback => handle.next(),
            Prompt::Finished => return,
        };
        if !sent {
            return;
        }

        // Piped input arrives all at once; wait for the engine to act on
        // this line before interpreting the next one.
        if prompt.changed().await.is_err() {
            return;
        }
    }
}
