use super::{
    address::{AddressError, WalletAddress, abbreviate},
    quote::group_thousands,
    registry::{ReferralRegistry, ShortCode},
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub const REF_PARAM: &str = "ref";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferralError {
    #[error(transparent)]
    Address(#[from] AddressError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralLink {
    pub address: WalletAddress,
    pub code: ShortCode,
    pub url: Url,
}

/// Validates `input`, assigns it a short code and builds
/// `<origin><path>?ref=<code>` from the page location. The registry is left
/// untouched when validation fails.
pub fn generate_link(
    registry: &mut ReferralRegistry,
    page: &Url,
    input: &str,
) -> Result<ReferralLink, ReferralError> {
    let address = WalletAddress::parse(input)?;
    let code = registry.assign_code(address.as_str());

    let mut url = page.clone();
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut().append_pair(REF_PARAM, code.as_str());

    Ok(ReferralLink { address, code, url })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferralSource {
    ShortCode,
    RawAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundReferral {
    pub referrer: String,
    pub source: ReferralSource,
    pub reward: u64,
}

impl InboundReferral {
    pub fn message(&self, symbol: &str) -> String {
        format!(
            "You were invited by {}! Both of you will earn {} {symbol} tokens after presale completion.",
            abbreviate(&self.referrer),
            group_thousands(&self.reward.to_string())
        )
    }
}

/// Looks for a `ref` parameter on the landing URL. A known short code wins;
/// otherwise a value with the wallet address shape is taken literally.
/// Anything else is ignored.
pub fn detect_inbound(
    registry: &ReferralRegistry,
    page: &Url,
    reward: u64,
) -> Option<InboundReferral> {
    let value = page
        .query_pairs()
        .find(|(key, _)| key == REF_PARAM)
        .map(|(_, value)| value.into_owned())?;

    let (referrer, source) = if let Some(address) = registry.resolve_code(&value) {
        (address.to_string(), ReferralSource::ShortCode)
    } else if WalletAddress::looks_like(&value) {
        (value, ReferralSource::RawAddress)
    } else {
        debug!(value = %value, "ignoring unresolved referral parameter");
        return None;
    };

    info!(referrer = %abbreviate(&referrer), ?source, "inbound referral detected");
    Some(InboundReferral {
        referrer,
        source,
        reward,
    })
}
