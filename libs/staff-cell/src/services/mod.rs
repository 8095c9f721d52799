pub mod password;
pub mod staff;

pub use staff::StaffService;
