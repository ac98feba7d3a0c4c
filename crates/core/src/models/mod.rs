//! Parish domain records

pub mod leader;
pub mod member;
pub mod news;
pub mod organisation;
pub mod sms;
pub mod user;

pub use leader::{generate_leader_id, Leader, Occupation};
pub use member::{
    generate_member_id, ChurchMember, Gender, MaritalStatus, MemberDocument, MemberStatus, SacramentRecord,
};
pub use news::{MediaType, News, NewsMedia};
pub use organisation::{Cell, ChurchYear, OutStation};
pub use sms::{SentSms, SMS_STATUS_PENDING};
pub use user::{LoginHistory, User, UserType, LAST_PATH_MAX_LEN};
