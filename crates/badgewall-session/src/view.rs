//! What the wall shows for a given session.
//!
//! The presentation layer renders from [`WallView`] and never inspects the
//! session directly, so the display rules live in one place.

use badgewall_common::badge::Badge;
use badgewall_common::models::{Session, SessionStatus};
use serde::Serialize;

/// Where users without a wallet are sent.
pub const INSTALL_URL: &str = "https://metamask.io/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountPanel {
    pub address: String,
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeCard {
    pub badge: Badge,
    pub title: &'static str,
    pub image_url: &'static str,
}

impl From<Badge> for BadgeCard {
    fn from(badge: Badge) -> Self {
        Self {
            badge,
            title: badge.title(),
            image_url: badge.image_url(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WallView {
    /// Link to [`INSTALL_URL`] instead of a connect button
    pub show_install_prompt: bool,
    pub show_connect_button: bool,
    /// Spinner inside the connect button
    pub connect_busy: bool,
    pub account: Option<AccountPanel>,
    pub badges: Vec<BadgeCard>,
}

impl WallView {
    pub fn from_session(session: &Session) -> Self {
        let loaded = session.is_page_loaded();
        let installed = session.is_provider_installed();

        let account = session.wallet_address.as_ref().map(|address| AccountPanel {
            address: address.clone(),
            balance: session.balance.clone().unwrap_or_default(),
        });

        let badges = if account.is_some() {
            Badge::ALL
                .into_iter()
                .filter(|badge| match badge {
                    Badge::Intro => session.intro_badge_owned,
                    Badge::Advanced => session.advanced_badge_owned,
                })
                .map(BadgeCard::from)
                .collect()
        } else {
            Vec::new()
        };

        Self {
            show_install_prompt: loaded && !installed,
            show_connect_button: loaded && installed && account.is_none(),
            connect_busy: session.status == SessionStatus::Loading,
            account,
            badges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probed(installed: bool) -> Session {
        Session {
            status: SessionStatus::Idle,
            provider_installed: Some(installed),
            ..Session::default()
        }
    }

    #[test]
    fn nothing_is_shown_before_the_probe() {
        let view = WallView::from_session(&Session::default());
        assert_eq!(view, WallView::default());
    }

    #[test]
    fn missing_wallet_shows_install_prompt() {
        let view = WallView::from_session(&probed(false));
        assert!(view.show_install_prompt);
        assert!(!view.show_connect_button);
    }

    #[test]
    fn installed_wallet_shows_connect_button_until_connected() {
        let mut session = probed(true);
        let view = WallView::from_session(&session);
        assert!(view.show_connect_button && !view.show_install_prompt && !view.connect_busy);

        session.status = SessionStatus::Loading;
        assert!(WallView::from_session(&session).connect_busy);

        session.wallet_address = Some("0xABC".into());
        session.balance = Some("0x10".into());
        let view = WallView::from_session(&session);
        assert!(!view.show_connect_button);
        assert_eq!(
            view.account,
            Some(AccountPanel { address: "0xABC".into(), balance: "0x10".into() })
        );
    }

    #[test]
    fn only_owned_badges_are_listed() {
        let session = Session {
            wallet_address: Some("0xABC".into()),
            balance: Some("0x0".into()),
            advanced_badge_owned: true,
            ..probed(true)
        };
        let view = WallView::from_session(&session);
        assert_eq!(view.badges.len(), 1);
        assert_eq!(view.badges[0].badge, Badge::Advanced);
        assert_eq!(view.badges[0].title, "WTF Solidity Advanced Pass (Test)");
    }

    #[test]
    fn badges_are_hidden_while_disconnected() {
        let session = Session {
            intro_badge_owned: true,
            ..probed(true)
        };
        assert!(WallView::from_session(&session).badges.is_empty());
    }
}
