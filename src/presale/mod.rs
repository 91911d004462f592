//! Presale domain logic. Nothing in here knows about the terminal.

pub mod address;
pub mod countdown;
pub mod quote;
pub mod referral;
pub mod registry;

pub use countdown::{Countdown, CountdownState};
pub use quote::{Currency, Quote, QuoteOutcome, RateTable};
pub use referral::{InboundReferral, ReferralLink, ReferralSource};
pub use registry::ReferralRegistry;
