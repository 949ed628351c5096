pub mod codeforces;

pub use codeforces::client::{CodeforcesClient, CodeforcesError, JudgeClient};
