//! User-visible failure notices

use crate::llm::{ClientError, FailureKind};

/// What the user sees when a turn is abandoned
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: FailureKind,
    pub message: String,
    pub hints: Vec<String>,
}

impl Notice {
    /// Build a notice for a failed configure or generate call
    pub fn from_error(err: &ClientError, model: &str) -> Self {
        match err.kind() {
            FailureKind::Connection => Self {
                kind: FailureKind::Connection,
                message: format!("Ollama 연결 오류: {}", err),
                hints: vec!["Ollama가 실행 중인지 확인해주세요.".to_string()],
            },
            FailureKind::Generation => Self {
                kind: FailureKind::Generation,
                message: format!("오류가 발생했습니다: {}", err),
                hints: vec![
                    "Ollama가 실행 중인가요?".to_string(),
                    format!("{} 모델이 설치되어 있나요? (ollama pull {} 실행)", model, model),
                    "네트워크 연결이 정상인가요?".to_string(),
                ],
            },
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_notice() {
        let notice = Notice::from_error(&ClientError::Connection("refused".to_string()), "m");
        assert_eq!(notice.kind, FailureKind::Connection);
        assert!(notice.message.starts_with("Ollama 연결 오류"));
        assert!(notice.message.contains("refused"));
        assert_eq!(notice.hints.len(), 1);
    }

    #[test]
    fn test_generation_notice_names_model() {
        let err = ClientError::Api {
            status: 404,
            message: "model not found".to_string(),
        };
        let notice = Notice::from_error(&err, "deepseek-r1:32b");
        assert_eq!(notice.kind, FailureKind::Generation);
        assert!(notice.to_string().contains("model not found"));
        assert!(notice.hints.iter().any(|h| h.contains("ollama pull deepseek-r1:32b")));
    }
}
