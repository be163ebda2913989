pub mod domain;
pub mod ports;

pub use domain::{
    Activity, ActivityKind, AuthSession, DiscussionPost, DiscussionReply, NewActivity,
    NewDiscussionPost, NewPaper, NewStudyGroup, NewStudySession, NewUser, Paper, StudyGroup,
    StudyGroupMember, StudySession, TargetKind, User,
};
pub use ports::{GroupFilter, PaperFilter, PortError, PortResult, PostFilter, StorageService};
