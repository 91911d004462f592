pub mod bottom_bar;
pub mod modal;
pub mod purchase;
pub mod referral;
pub mod top;
pub mod util;
