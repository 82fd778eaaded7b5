pub mod classroom;
pub mod exam;
pub mod payload;
pub mod question_bank;
pub mod user;

pub use classroom::{Classroom, NewClassroom, NewStudent, Student};
pub use exam::{
    normalize_answer_keys, ExamTest, NewTest, StudentResult, SubmissionSummary, SubmissionUpload, TestSummary,
    UploadReceipt,
};
pub use payload::{compact_object, unwrap_envelope};
pub use question_bank::{
    BankQuestion, Chapter, ChapterInput, QuestionFilter, QuestionKind, Section, SectionInput, Subject, SubjectInput,
};
pub use user::{Credentials, RegisterRequest, UserProfile};
