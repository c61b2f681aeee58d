//! Identity parameters handed to the connect page through its query string.

use url::form_urlencoded;

/// Query key carrying the expected wallet address.
pub const WALLET_ADDRESS_KEY: &str = "walletAddress";
/// Query key carrying the game id.
pub const GAME_ID_KEY: &str = "gameId";
/// Query key carrying the player's username.
pub const USERNAME_KEY: &str = "username";

/// Expected identity for the automatic lobby join.
///
/// Every field is optional; the automatic join only runs when all three are
/// present (see [`JoinParams::is_complete`]). Empty values count as absent.
///
/// # Example
///
/// ```
/// use wallet_lobby_client::params::JoinParams;
///
/// let params = JoinParams::from_query("?walletAddress=0xabc&gameId=g1&username=bob");
/// assert!(params.is_complete());
/// assert_eq!(params.username.as_deref(), Some("bob"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinParams {
    /// Address the connected wallet must match.
    pub wallet_address: Option<String>,
    /// Game whose lobby should be joined.
    pub game_id: Option<String>,
    /// Display name of the joining player.
    pub username: Option<String>,
}

impl JoinParams {
    pub fn new(
        wallet_address: impl Into<String>,
        game_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            wallet_address: non_empty(wallet_address.into()),
            game_id: non_empty(game_id.into()),
            username: non_empty(username.into()),
        }
    }

    /// Parse the three keys out of a URL query string.
    ///
    /// A leading `?` is ignored, values are percent-decoded and unknown keys
    /// are skipped. When a key repeats, the first occurrence wins, even if
    /// it is empty. Values are kept as sent, surrounding spaces included.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        let (mut wallet_seen, mut game_seen, mut username_seen) = (false, false, false);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let (slot, seen) = match key.as_ref() {
                WALLET_ADDRESS_KEY => (&mut params.wallet_address, &mut wallet_seen),
                GAME_ID_KEY => (&mut params.game_id, &mut game_seen),
                USERNAME_KEY => (&mut params.username, &mut username_seen),
                _ => continue,
            };
            if !*seen {
                *seen = true;
                *slot = non_empty(value.into_owned());
            }
        }
        params
    }

    /// Returns `true` when all three parameters are present.
    pub fn is_complete(&self) -> bool {
        self.wallet_address.is_some() && self.game_id.is_some() && self.username.is_some()
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_three_keys() {
        let params = JoinParams::from_query(
            "walletAddress=0xAAA0000000000000000000000000000000000001&gameId=g1&username=bob",
        );
        assert_eq!(
            params,
            JoinParams::new("0xAAA0000000000000000000000000000000000001", "g1", "bob")
        );
        assert!(params.is_complete());
    }

    #[test]
    fn percent_decodes_values() {
        let params = JoinParams::from_query("?username=big%20bob&gameId=table+7");
        assert_eq!(params.username.as_deref(), Some("big bob"));
        assert_eq!(params.game_id.as_deref(), Some("table 7"));
        assert!(params.wallet_address.is_none());
        assert!(!params.is_complete());
    }

    #[test]
    fn empty_values_are_absent() {
        let params = JoinParams::from_query("walletAddress=&gameId=g1&username=bob");
        assert!(params.wallet_address.is_none());
        assert!(!params.is_complete());
    }

    #[test]
    fn empty_query_is_incomplete() {
        assert_eq!(JoinParams::from_query(""), JoinParams::default());
        assert_eq!(JoinParams::from_query("?"), JoinParams::default());
    }

    #[test]
    fn first_occurrence_wins_and_unknown_keys_are_skipped() {
        let params = JoinParams::from_query("gameId=first&theme=dark&gameId=second");
        assert_eq!(params.game_id.as_deref(), Some("first"));
    }

    #[test]
    fn empty_first_occurrence_is_not_overridden() {
        let params = JoinParams::from_query(
            "walletAddress=&walletAddress=0xabc&gameId=g1&username=bob",
        );
        assert!(params.wallet_address.is_none());
        assert!(!params.is_complete());
    }

    #[test]
    fn values_keep_surrounding_spaces() {
        let params = JoinParams::from_query("username=+big+bob+&gameId=%20");
        assert_eq!(params.username.as_deref(), Some(" big bob "));
        assert_eq!(params.game_id.as_deref(), Some(" "));
        assert_eq!(
            JoinParams::new("0xabc", "g1", " bob").username.as_deref(),
            Some(" bob")
        );
    }
}
