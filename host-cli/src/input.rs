//! 玩家输入解析
//!
//! 每行一条输入：
//!
//! ```text
//! （空行）       点击
//! 2              选择第 2 个选项（从 1 开始）
//! :save          存档
//! :load          读档
//! :jump <场景>   跳转到场景
//! :log           查看历史
//! :restart       从头开始
//! :quit          退出
//! ```

use thiserror::Error;

/// 玩家输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerInput {
    Click,
    /// 选项序号（从 0 开始）
    Choose(usize),
    Save,
    Load,
    Jump(String),
    Log,
    Restart,
    Quit,
}

/// 输入解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("未知命令: {0}")]
    UnknownCommand(String),

    #[error("命令 :{0} 缺少参数")]
    MissingArgument(&'static str),

    #[error("无效的选项序号: {0}（从 1 开始）")]
    InvalidNumber(String),
}

impl PlayerInput {
    /// 解析一行输入
    pub fn parse(line: &str) -> Result<Self, InputError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Self::Click);
        }

        if let Some(command) = line.strip_prefix(':') {
            let (name, arg) = match command.split_once(char::is_whitespace) {
                Some((name, arg)) => (name, arg.trim()),
                None => (command, ""),
            };
            return match name {
                "save" => Ok(Self::Save),
                "load" => Ok(Self::Load),
                "log" => Ok(Self::Log),
                "restart" => Ok(Self::Restart),
                "quit" | "q" => Ok(Self::Quit),
                "jump" if arg.is_empty() => Err(InputError::MissingArgument("jump")),
                "jump" => Ok(Self::Jump(arg.to_string())),
                _ => Err(InputError::UnknownCommand(line.to_string())),
            };
        }

        match line.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(Self::Choose(n - 1)),
            _ => Err(InputError::InvalidNumber(line.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inputs() {
        assert_eq!(PlayerInput::parse(""), Ok(PlayerInput::Click));
        assert_eq!(PlayerInput::parse("   "), Ok(PlayerInput::Click));
        assert_eq!(PlayerInput::parse("1"), Ok(PlayerInput::Choose(0)));
        assert_eq!(PlayerInput::parse(" 3 "), Ok(PlayerInput::Choose(2)));
        assert_eq!(PlayerInput::parse(":save"), Ok(PlayerInput::Save));
        assert_eq!(PlayerInput::parse(":load"), Ok(PlayerInput::Load));
        assert_eq!(PlayerInput::parse(":log"), Ok(PlayerInput::Log));
        assert_eq!(PlayerInput::parse(":restart"), Ok(PlayerInput::Restart));
        assert_eq!(PlayerInput::parse(":q"), Ok(PlayerInput::Quit));
        assert_eq!(
            PlayerInput::parse(":jump  scene-2 "),
            Ok(PlayerInput::Jump("scene-2".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            PlayerInput::parse(":jump"),
            Err(InputError::MissingArgument("jump"))
        );
        assert_eq!(
            PlayerInput::parse(":dance"),
            Err(InputError::UnknownCommand(":dance".to_string()))
        );
        assert!(matches!(
            PlayerInput::parse("0"),
            Err(InputError::InvalidNumber(_))
        ));
        assert!(matches!(
            PlayerInput::parse("hello"),
            Err(InputError::InvalidNumber(_))
        ));
    }
}
