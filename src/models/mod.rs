pub mod course;
pub mod enrollment;
pub mod submission;
pub mod user;
pub mod work;

pub use course::{Course, CourseStatus, NewCourseRequest, UpdateCourseRequest};
pub use enrollment::Enrollment;
pub use submission::{Submission, SubmissionStatus};
pub use user::{Actor, UserProfile};
pub use work::CourseWork;
