//! The `intervue init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("intervue.toml").exists() {
        println!("intervue.toml already exists, skipping.");
    } else {
        std::fs::write("intervue.toml", SAMPLE_CONFIG)?;
        println!("Created intervue.toml");
    }

    std::fs::create_dir_all("question-sets")?;
    let example_path = std::path::Path::new("question-sets/example.toml");
    if example_path.exists() {
        println!("question-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTION_SET)?;
        println!("Created question-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit question-sets/example.toml with your own questions");
    println!("  2. Run: intervue validate --question-set question-sets/example.toml");
    println!("  3. Run: intervue create --question-set question-sets/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# intervue configuration

# "file" keeps question sets and results under data_dir; "memory" forgets them on exit
store = "file"
data_dir = "./intervue-data"

# seconds per question
time_limit_secs = 120
"#;

const EXAMPLE_QUESTION_SET: &str = r#"[question_set]
name = "Example Interview"

[[questions]]
id = "http-verbs"
difficulty = "easy"
text = "Which HTTP methods are idempotent, and why does it matter?"
keywords = ["get", "put", "delete", "retry"]

[[questions]]
id = "git-rebase"
difficulty = "easy"
text = "What is the difference between git merge and git rebase?"
keywords = ["history", "merge commit", "linear"]

[[questions]]
id = "db-index"
difficulty = "medium"
text = "How does a database index speed up queries, and what does it cost?"
keywords = ["b-tree", "lookup", "write", "storage"]
max_score = 8

[[questions]]
id = "cache-invalidation"
difficulty = "medium"
text = "Describe two strategies for cache invalidation."
keywords = ["ttl", "write-through", "stale"]

[[questions]]
id = "consensus"
difficulty = "hard"
text = "Explain how a leader is elected in Raft."
keywords = ["term", "vote", "majority", "heartbeat", "timeout"]

[[questions]]
id = "backpressure"
difficulty = "hard"
text = "What is backpressure and how would you implement it in a streaming pipeline?"
keywords = ["buffer", "bounded", "producer", "consumer"]
"#;
