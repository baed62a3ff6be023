//! Authorization (consent page) URL

use crate::constants::AUTHORIZE_PATH;

/// Build the consent page URL for the Authorization Code flow.
///
/// `scope` is the space-delimited scope string; every value is
/// percent-encoded, so spaces become `%20`.
pub fn build_authorization_url(
    accounts_url: &str,
    client_id: &str,
    scope: &str,
    redirect_uri: &str,
    state: &str,
) -> String {
    format!(
        "{}{}?response_type=code&client_id={}&scope={}&redirect_uri={}&state={}",
        accounts_url.trim_end_matches('/'),
        AUTHORIZE_PATH,
        urlencoding::encode(client_id),
        urlencoding::encode(scope),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(state),
    )
}
