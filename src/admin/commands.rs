//! Admin command types and parsing.
//!
//! Maps command names to the closed set of admin commands and turns raw
//! command arguments into typed commands. Also holds the texts sent back to
//! the admin.

use std::fmt;

pub const CLEAR_USAGE: &str = "Use it this way: `/clear 31416 27183`";
pub const PAY_USAGE: &str =
    "Please specify Telegram ID and bonus amount like this: `/pay 31416 10 Thanks!`";
pub const PAY_SUCCESS: &str = "Success.";

/// Names of the commands only admins may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminCommandName {
    Clear,
    Pay,
}

const COMMAND_NAMES: &[(&str, AdminCommandName)] = &[
    ("clear", AdminCommandName::Clear),
    ("pay", AdminCommandName::Pay),
];

impl AdminCommandName {
    /// Looks up an admin command by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        COMMAND_NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, cmd)| *cmd)
    }

    fn as_str(&self) -> &'static str {
        match self {
            AdminCommandName::Clear => "clear",
            AdminCommandName::Pay => "pay",
        }
    }
}

impl fmt::Display for AdminCommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated admin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// End the stranger's current talk
    Clear { telegram_id: i64 },
    /// Credit bonus points to a stranger
    Pay {
        telegram_id: i64,
        amount: i64,
        reason: String,
    },
}

/// Arguments that could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// `clear` got something that is not a Telegram ID
    InvalidTelegramId(String),
    /// `pay` is missing its ID or amount, or they are not integers
    MalformedPay,
}

impl ArgumentError {
    /// Notifications explaining the rejection, in sending order.
    pub fn notifications(&self) -> Vec<String> {
        match self {
            ArgumentError::InvalidTelegramId(raw) => vec![
                format!("Is it really telegram_id: \"{}\"?", raw),
                CLEAR_USAGE.to_string(),
            ],
            ArgumentError::MalformedPay => vec![PAY_USAGE.to_string()],
        }
    }
}

impl AdminCommand {
    /// Builds the command `name` from its raw arguments.
    pub fn parse(name: AdminCommandName, args: Option<&str>) -> Result<Self, ArgumentError> {
        match name {
            AdminCommandName::Clear => parse_clear(args),
            AdminCommandName::Pay => parse_pay(args),
        }
    }
}

fn parse_clear(args: Option<&str>) -> Result<AdminCommand, ArgumentError> {
    let raw = args.unwrap_or_default();
    let telegram_id = raw
        .trim()
        .parse()
        .map_err(|_| ArgumentError::InvalidTelegramId(raw.to_string()))?;

    Ok(AdminCommand::Clear { telegram_id })
}

fn parse_pay(args: Option<&str>) -> Result<AdminCommand, ArgumentError> {
    let mut tokens = args.ok_or(ArgumentError::MalformedPay)?.split_whitespace();

    let telegram_id = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or(ArgumentError::MalformedPay)?;
    let amount = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or(ArgumentError::MalformedPay)?;
    let reason = tokens.collect::<Vec<_>>().join(" ");

    Ok(AdminCommand::Pay {
        telegram_id,
        amount,
        reason,
    })
}

pub fn cleared(telegram_id: i64) -> String {
    format!("Stranger {} was cleared", telegram_id)
}

pub fn clear_not_found(telegram_id: i64, error: impl fmt::Display) -> String {
    format!("Stranger {} wasn't found: {}", telegram_id, error)
}

pub fn pay_not_found(error: impl fmt::Display) -> String {
    format!("Stranger wasn't found: {}", error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_name_lookup() {
        assert_eq!(AdminCommandName::from_name("clear"), Some(AdminCommandName::Clear));
        assert_eq!(AdminCommandName::from_name("PAY"), Some(AdminCommandName::Pay));
        assert_eq!(AdminCommandName::from_name("begin"), None);
        assert_eq!(AdminCommandName::from_name(""), None);
    }

    #[test]
    fn test_command_name_display_matches_lookup() {
        for name in [AdminCommandName::Clear, AdminCommandName::Pay] {
            assert_eq!(AdminCommandName::from_name(&name.to_string()), Some(name));
        }
        assert_eq!(AdminCommandName::Pay.to_string(), "pay");
    }

    #[test]
    fn test_parse_clear() {
        let cmd = AdminCommand::parse(AdminCommandName::Clear, Some(" 31416 ")).unwrap();
        assert_eq!(cmd, AdminCommand::Clear { telegram_id: 31416 });
    }

    #[test]
    fn test_parse_clear_invalid() {
        let err = AdminCommand::parse(AdminCommandName::Clear, Some("foo")).unwrap_err();
        assert_eq!(err, ArgumentError::InvalidTelegramId("foo".to_string()));
        assert_eq!(
            err.notifications(),
            vec![
                "Is it really telegram_id: \"foo\"?".to_string(),
                CLEAR_USAGE.to_string()
            ]
        );

        // Several IDs are not one ID
        let err = AdminCommand::parse(AdminCommandName::Clear, Some("31416 27183")).unwrap_err();
        assert_eq!(err, ArgumentError::InvalidTelegramId("31416 27183".to_string()));

        let err = AdminCommand::parse(AdminCommandName::Clear, None).unwrap_err();
        assert_eq!(err, ArgumentError::InvalidTelegramId(String::new()));
    }

    #[test]
    fn test_parse_pay() {
        let cmd =
            AdminCommand::parse(AdminCommandName::Pay, Some("31416 27183  foo   gratitude"))
                .unwrap();
        assert_eq!(
            cmd,
            AdminCommand::Pay {
                telegram_id: 31416,
                amount: 27183,
                reason: "foo gratitude".to_string()
            }
        );

        let cmd = AdminCommand::parse(AdminCommandName::Pay, Some("31416 10")).unwrap();
        assert_eq!(
            cmd,
            AdminCommand::Pay {
                telegram_id: 31416,
                amount: 10,
                reason: String::new()
            }
        );
    }

    #[test]
    fn test_parse_pay_malformed() {
        for args in [None, Some("foo"), Some("31416"), Some("31416 ten"), Some("")] {
            let err = AdminCommand::parse(AdminCommandName::Pay, args).unwrap_err();
            assert_eq!(err, ArgumentError::MalformedPay);
            assert_eq!(err.notifications(), vec![PAY_USAGE.to_string()]);
        }
    }

    #[test]
    fn test_notification_texts() {
        assert_eq!(cleared(31416), "Stranger 31416 was cleared");
        assert_eq!(
            clear_not_found(31416, "gone"),
            "Stranger 31416 wasn't found: gone"
        );
        assert_eq!(pay_not_found("gone"), "Stranger wasn't found: gone");
    }
}
