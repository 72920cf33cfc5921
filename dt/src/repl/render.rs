//! Text rendering for turns, panels and notices

use colored::Colorize;

use crate::config::AboutConfig;
use crate::conversation::{Role, Turn};
use crate::llm::ModelInfo;
use crate::session::{Notice, Panel};

/// Header shown at startup
pub const TITLE: &str = "Deeptok";

/// Input prompt hint
pub const PLACEHOLDER: &str = "메시지를 입력하세요...";

/// Shown while waiting for a non-streamed answer
pub const WAITING: &str = "응답 생성 중...";

/// Steps shown in the settings panel
pub const USAGE_GUIDE: [&str; 3] = [
    "메시지를 입력하세요",
    "Temperature로 창의성을 조절하세요",
    "'/clear'로 대화 내역을 지우고 새로운 대화를 시작하세요",
];

/// Data a panel may display
pub struct PanelContext<'a> {
    pub temperature: f32,
    pub model: &'a str,
    pub about: &'a AboutConfig,
    /// Installed models, when the runtime answered
    pub installed: Option<&'a [ModelInfo]>,
}

/// Speaker label, colored by role
pub fn speaker(role: Role) -> String {
    match role {
        Role::User => role.label().bright_green().bold().to_string(),
        Role::Assistant => role.label().bright_blue().bold().to_string(),
    }
}

/// One labeled message
pub fn render_turn(turn: &Turn) -> String {
    format!("{}: {}", speaker(turn.role()), turn.content())
}

/// The whole transcript, oldest first
pub fn render_transcript(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "대화 내역이 없습니다.".dimmed().to_string();
    }
    turns.iter().map(render_turn).collect::<Vec<_>>().join("\n\n")
}

/// Failure message followed by a numbered checklist
pub fn render_notice(notice: &Notice) -> String {
    let mut out = notice.message.red().to_string();
    if notice.hints.len() == 1 {
        out.push('\n');
        out.push_str(&notice.hints[0].yellow().to_string());
    } else if !notice.hints.is_empty() {
        out.push('\n');
        out.push_str(&"다음 사항들을 확인해주세요:".yellow().to_string());
        for (i, hint) in notice.hints.iter().enumerate() {
            out.push_str(&format!("\n  {}. {}", i + 1, hint));
        }
    }
    out
}

/// A side panel as a titled block
pub fn render_panel(panel: Panel, ctx: &PanelContext<'_>) -> String {
    let mut out = format!("## {}", panel.title()).bright_cyan().bold().to_string();
    match panel {
        Panel::Settings => {
            out.push_str(&format!("\nTemperature: {:.1}", ctx.temperature));
            out.push_str(&format!("\n{}", "/temp <0.0-1.0> 으로 변경".dimmed()));
            out.push_str(&format!("\n{}", "### 사용 방법".bright_cyan()));
            for (i, step) in USAGE_GUIDE.iter().enumerate() {
                out.push_str(&format!("\n  {}. {}", i + 1, step));
            }
        }
        Panel::Developer => {
            out.push_str(&format!("\n개발자: {}", ctx.about.developer));
            out.push_str(&format!("\n연락처: {}", ctx.about.contact));
        }
        Panel::Model => {
            out.push_str(&format!("\n모델: {}", ctx.model));
            match ctx.installed {
                Some([]) => out.push_str(&format!("\n{}", "설치된 모델이 없습니다.".dimmed())),
                Some(models) => {
                    out.push_str("\n설치된 모델:");
                    for model in models {
                        out.push_str(&format!("\n  - {}", render_model(model)));
                    }
                }
                None => out.push_str(&format!("\n{}", "설치된 모델 목록을 가져올 수 없습니다.".dimmed())),
            }
        }
    }
    out
}

/// Model name with human-readable size
pub fn render_model(model: &ModelInfo) -> String {
    match model.size {
        Some(bytes) => format!("{} ({})", model.name, human_size(bytes)),
        None => model.name.clone(),
    }
}

fn human_size(bytes: u64) -> String {
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let bytes = bytes as f64;
    if bytes >= GB {
        format!("{:.1} GB", bytes / GB)
    } else {
        format!("{:.0} MB", bytes / MB)
    }
}
