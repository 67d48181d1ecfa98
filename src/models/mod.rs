pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskInput, TaskPriority, TaskQuery, TaskStatus};
pub use user::{Credential, NewCredential, User, UserId};
