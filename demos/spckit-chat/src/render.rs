//! Terminal rendering of session changes.

use spckit::primitives::{BuildCategory, ChatRole, ChatTurn, Component, SessionId, format_price};
use spckit::session::{SelectedParts, SessionObserver};

/// Prints session changes to stdout.
#[derive(Debug, Default)]
pub struct TerminalObserver;

impl SessionObserver for TerminalObserver {
    fn on_history_changed(&self, _session: SessionId, history: &[ChatTurn]) {
        if let Some(turn) = history.last()
            && turn.role() == ChatRole::Model
            && !turn.is_pending()
        {
            println!("\nSpckit AI ▸ {}\n", turn.text());
        }
    }

    fn on_candidates_changed(&self, _session: SessionId, candidates: &[Component]) {
        if candidates.is_empty() {
            return;
        }
        println!("추천 부품 (/select 번호 로 선택):");
        for (index, component) in candidates.iter().enumerate() {
            println!("{}", candidate_line(index + 1, component));
        }
        println!();
    }

    fn on_selected_parts_changed(&self, _session: SessionId, parts: &SelectedParts, total: u64) {
        println!("선택한 부품 {}개, 총 예상 가격 {}", parts.len(), format_price(total));
    }

    fn on_loading_changed(&self, _session: SessionId, loading: bool) {
        if loading {
            println!("Spckit AI가 견적을 준비하고 있어요...");
        }
    }

    fn on_stage_changed(&self, _session: SessionId, stage: Option<BuildCategory>, complete: bool) {
        match (stage, complete) {
            (_, true) => println!("모든 단계를 마쳤습니다. /parts 로 견적을 확인하세요."),
            (Some(category), false) => println!("현재 단계: {category}"),
            (None, false) => {}
        }
    }
}

pub fn candidate_line(number: usize, component: &Component) -> String {
    let features = if component.features().is_empty() {
        String::new()
    } else {
        format!(" ({})", component.features().join(", "))
    };
    format!(
        "  {number}. [{}] {} - {}{features}",
        component.category(),
        component.name(),
        component.price()
    )
}

pub fn print_parts(parts: &SelectedParts) {
    if parts.is_empty() {
        println!("아직 선택한 부품이 없습니다.");
        return;
    }
    println!("선택한 부품:");
    for component in parts {
        println!("  [{}] {} - {}", component.category(), component.name(), component.price());
    }
    println!("총 예상 가격: {}", parts.formatted_total());
}

pub fn print_help() {
    println!(
        "명령어:\n  \
         /select N    추천 목록의 N번 부품 선택\n  \
         /remove 분류  해당 분류의 선택 해제 (예: /remove GPU)\n  \
         /next        다음 단계로 이동 (단계별 견적 모드)\n  \
         /parts       선택한 부품과 총액 보기\n  \
         /home        처음으로 돌아가기\n  \
         /quit        종료\n\
         그 외 입력은 Spckit AI에게 전달됩니다."
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_candidate_lines() {
        let component = Component::new(
            "CPU",
            "AMD 라이젠 7 7800X3D",
            "약 450,000원",
            vec!["8코어".to_owned(), "3D V-Cache".to_owned()],
        );
        assert_eq!(
            candidate_line(1, &component),
            "  1. [CPU] AMD 라이젠 7 7800X3D - 약 450,000원 (8코어, 3D V-Cache)"
        );
    }
}
