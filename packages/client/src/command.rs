//! Interactive command parsing.

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        script_id: String,
        max_players: Option<usize>,
    },
    Join {
        room_id: String,
    },
    Leave,
    Ready(bool),
    Start,
    /// Explicit phase token, or the next one in the script's order.
    Phase(Option<String>),
    Clue(String),
    Scripts,
    Room,
    Help,
    Quit,
    Chat(String),
}

pub const HELP: &str = "\
/create <script> [max]  create a room
/join <room>            join a room by its 6-digit id
/leave                  leave the current room
/ready | /unready       toggle readiness
/start                  start the game (host only)
/phase [token]          move to a phase (next one when omitted)
/clue <id>              report a discovered clue
/scripts                list available scripts
/room                   show the current room
/quit                   exit
anything else           chat";

impl Command {
    /// Parse a trimmed, non-empty input line.
    ///
    /// Returns a usage message when a slash command is malformed.
    pub fn parse(line: &str) -> Result<Self, String> {
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Chat(line.to_string()));
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        match (name, args.as_slice()) {
            ("create", [script_id]) => Ok(Command::Create {
                script_id: script_id.to_string(),
                max_players: None,
            }),
            ("create", [script_id, max]) => {
                let max_players = max
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| format!("max must be a positive number: '{}'", max))?;
                Ok(Command::Create {
                    script_id: script_id.to_string(),
                    max_players: Some(max_players),
                })
            }
            ("create", _) => Err("usage: /create <script> [max]".to_string()),
            ("join", [room_id]) => Ok(Command::Join {
                room_id: room_id.to_string(),
            }),
            ("join", _) => Err("usage: /join <room>".to_string()),
            ("leave", []) => Ok(Command::Leave),
            ("ready", []) => Ok(Command::Ready(true)),
            ("unready", []) => Ok(Command::Ready(false)),
            ("start", []) => Ok(Command::Start),
            ("phase", []) => Ok(Command::Phase(None)),
            ("phase", [token]) => Ok(Command::Phase(Some(token.to_string()))),
            ("clue", [clue_id]) => Ok(Command::Clue(clue_id.to_string())),
            ("clue", _) => Err("usage: /clue <id>".to_string()),
            ("scripts", []) => Ok(Command::Scripts),
            ("room", []) => Ok(Command::Room),
            ("help", _) => Ok(Command::Help),
            ("quit", _) | ("exit", _) => Ok(Command::Quit),
            _ => Err(format!("unknown command '/{}', try /help", rest)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        // テスト項目: スラッシュで始まらない行はチャットになる
        // given (前提条件):
        let line = "who has the knife?";

        // when (操作):
        let command = Command::parse(line);

        // then (期待する結果):
        assert_eq!(command, Ok(Command::Chat(line.to_string())));
    }

    #[test]
    fn test_create_with_and_without_max() {
        // テスト項目: /create は最大人数を省略できる
        // given (前提条件):

        // when (操作):
        let without = Command::parse("/create esther-story");
        let with = Command::parse("/create esther-story 4");

        // then (期待する結果):
        assert_eq!(
            without,
            Ok(Command::Create {
                script_id: "esther-story".to_string(),
                max_players: None
            })
        );
        assert_eq!(
            with,
            Ok(Command::Create {
                script_id: "esther-story".to_string(),
                max_players: Some(4)
            })
        );
    }

    #[test]
    fn test_create_rejects_zero_max() {
        // テスト項目: 最大人数に 0 は指定できない
        // given (前提条件):

        // when (操作):
        let result = Command::parse("/create esther-story 0");

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_phase_token_is_optional() {
        // テスト項目: /phase はトークンを省略できる
        // given (前提条件):

        // when (操作):
        let next = Command::parse("/phase");
        let explicit = Command::parse("/phase READING");

        // then (期待する結果):
        assert_eq!(next, Ok(Command::Phase(None)));
        assert_eq!(explicit, Ok(Command::Phase(Some("READING".to_string()))));
    }

    #[test]
    fn test_unknown_and_malformed_commands() {
        // テスト項目: 未知のコマンドと引数不足はエラーになる
        // given (前提条件):

        // when (操作):
        let unknown = Command::parse("/dance");
        let missing = Command::parse("/join");

        // then (期待する結果):
        assert!(unknown.unwrap_err().contains("unknown command"));
        assert_eq!(missing, Err("usage: /join <room>".to_string()));
    }
}
