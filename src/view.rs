// Display-ready view state derived from the workflow record

use serde::Serialize;
use std::fmt;

use crate::types::{ContractData, HeirRelationship, InheritanceChecklist};
use crate::workflow::{Phase, WorkflowState};

pub const EXTRACTING_NOTICE: &str = "解析中... (OCR & AI処理)";
pub const CHECKING_NOTICE: &str = "AI解析中...";

/// Format an integer amount as yen with thousands separators, e.g. `¥1,234,000`
pub fn format_yen(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    grouped.push('¥');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Inverse of [`format_yen`]
pub fn parse_yen(text: &str) -> Option<u64> {
    let digits = text.trim().strip_prefix('¥')?;
    if digits.is_empty() || digits.starts_with(',') || digits.ends_with(',') {
        return None;
    }
    let groups: Vec<&str> = digits.split(',').collect();
    let (head, tail) = groups.split_first()?;
    if head.is_empty() || head.len() > 3 || tail.iter().any(|g| g.len() != 3) {
        return None;
    }
    // Only a bare "0" may start with zero
    if head.starts_with('0') && (head.len() > 1 || !tail.is_empty()) {
        return None;
    }
    groups.concat().parse().ok()
}

/// Confidence badge text, e.g. `信頼度: 92%`; empty when the score is missing
pub fn format_confidence(score: Option<f64>) -> String {
    match score {
        Some(s) if s.is_finite() => format!("信頼度: {}%", (s * 100.0).round() as i64),
        _ => String::new(),
    }
}

fn format_fee(fee: Option<u64>) -> String {
    fee.map(format_yen).unwrap_or_default()
}

fn format_fee_with_cycle(fee: Option<u64>, cycle: &str) -> String {
    let amount = format_fee(fee);
    match (amount.is_empty(), cycle.is_empty()) {
        (_, true) => amount,
        (true, false) => format!("({cycle})"),
        (false, false) => format!("{amount} ({cycle})"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractView {
    pub confidence: String,
    pub holder: String,
    pub plot_number: String,
    pub contract_date: String,
    pub perpetual_lease_fee: String,
    pub management_fee: String,
    pub transfer_conditions: String,
    pub cancellation_conditions: String,
}

impl ContractView {
    pub fn from_contract(contract: &ContractData) -> Self {
        Self {
            confidence: format_confidence(contract.confidence_score),
            holder: contract.contract_holder.clone(),
            plot_number: contract.plot_number.clone(),
            contract_date: contract.contract_date.clone(),
            perpetual_lease_fee: format_fee(contract.perpetual_lease_fee),
            management_fee: format_fee_with_cycle(contract.management_fee, &contract.management_fee_cycle),
            transfer_conditions: contract.transfer_conditions.clone(),
            cancellation_conditions: contract.cancellation_conditions.clone(),
        }
    }
}

impl fmt::Display for ContractView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "抽出データ  [{}]", self.confidence)?;
        writeln!(f, "  契約者名    {}", self.holder)?;
        writeln!(f, "  区画番号    {}", self.plot_number)?;
        writeln!(f, "  契約日      {}", self.contract_date)?;
        writeln!(f, "  永代使用料  {}", self.perpetual_lease_fee)?;
        writeln!(f, "  管理費      {}", self.management_fee)?;
        writeln!(f, "名義変更条件 (抽出条文)")?;
        writeln!(f, "  {}", self.transfer_conditions)?;
        writeln!(f, "返還条件 (抽出条文)")?;
        write!(f, "  {}", self.cancellation_conditions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistBranch {
    Transferable,
    Restricted,
}

impl ChecklistBranch {
    pub fn marker(&self) -> &'static str {
        match self {
            ChecklistBranch::Transferable => "●",
            ChecklistBranch::Restricted => "×",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            ChecklistBranch::Transferable => "名義変更 可能です",
            ChecklistBranch::Restricted => "名義変更に制限があります",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedDocument {
    pub number: usize,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistView {
    pub branch: ChecklistBranch,
    pub notes: String,
    pub documents: Vec<NumberedDocument>,
}

impl ChecklistView {
    pub fn from_checklist(checklist: &InheritanceChecklist) -> Self {
        let branch = if checklist.can_transfer {
            ChecklistBranch::Transferable
        } else {
            ChecklistBranch::Restricted
        };
        Self {
            branch,
            notes: checklist.notes.clone(),
            documents: checklist
                .required_documents
                .iter()
                .enumerate()
                .map(|(i, title)| NumberedDocument {
                    number: i + 1,
                    title: title.clone(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for ChecklistView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.branch.marker(), self.branch.headline())?;
        if !self.notes.is_empty() {
            writeln!(f, "  {}", self.notes)?;
        }
        write!(f, "必要書類リスト")?;
        for doc in &self.documents {
            write!(f, "\n  {}. {}", doc.number, doc.title)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipChoice {
    pub value: HeirRelationship,
    pub label: &'static str,
    pub selected: bool,
}

/// Everything the rendering layer needs, derived from [`WorkflowState`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowView {
    pub phase: Phase,
    pub file_name: Option<String>,
    pub extracting: bool,
    pub extraction_error: Option<String>,
    pub contract: Option<ContractView>,
    pub relationships: Vec<RelationshipChoice>,
    pub checklist_loading: bool,
    pub check_enabled: bool,
    pub checklist: Option<ChecklistView>,
}

impl WorkflowView {
    pub fn from_state(state: &WorkflowState) -> Self {
        let phase = state.phase();
        Self {
            phase,
            file_name: state.file.as_ref().map(|f| f.name.clone()),
            extracting: state.extracting,
            extraction_error: state.extraction_error.clone(),
            contract: state.contract.as_ref().map(ContractView::from_contract),
            relationships: HeirRelationship::ALL
                .iter()
                .map(|r| RelationshipChoice {
                    value: *r,
                    label: r.label(),
                    selected: *r == state.relationship,
                })
                .collect(),
            checklist_loading: state.checklist_loading,
            check_enabled: phase == Phase::Extracted,
            checklist: state.checklist.as_ref().map(ChecklistView::from_checklist),
        }
    }

    /// Show the upload area only while no contract is held
    pub fn shows_upload(&self) -> bool {
        self.contract.is_none()
    }
}

impl fmt::Display for WorkflowView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shows_upload() {
            writeln!(f, "新規契約書の登録")?;
            if let Some(name) = &self.file_name {
                writeln!(f, "  ファイル: {name}")?;
            }
            if self.extracting {
                writeln!(f, "  {EXTRACTING_NOTICE}")?;
            }
            if let Some(error) = &self.extraction_error {
                writeln!(f, "  {error}")?;
            }
            return Ok(());
        }

        if let Some(contract) = &self.contract {
            writeln!(f, "{contract}")?;
            writeln!(f)?;
        }
        writeln!(f, "相続シミュレーション")?;
        match &self.checklist {
            Some(checklist) => writeln!(f, "{checklist}")?,
            None => {
                for choice in &self.relationships {
                    let mark = if choice.selected { "(*)" } else { "( )" };
                    writeln!(f, "  {mark} {} [{}]", choice.label, choice.value)?;
                }
                if self.checklist_loading {
                    writeln!(f, "  {CHECKING_NOTICE}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_contract() -> ContractData {
        ContractData {
            contract_holder: "山田太郎".to_string(),
            plot_number: "A-12".to_string(),
            contract_date: "2020-04-01".to_string(),
            perpetual_lease_fee: Some(300000),
            management_fee: Some(5000),
            management_fee_cycle: "年次".to_string(),
            transfer_conditions: "...".to_string(),
            cancellation_conditions: "...".to_string(),
            confidence_score: Some(0.92),
        }
    }

    #[test]
    fn test_format_yen() {
        assert_eq!(format_yen(0), "¥0");
        assert_eq!(format_yen(999), "¥999");
        assert_eq!(format_yen(1000), "¥1,000");
        assert_eq!(format_yen(1234000), "¥1,234,000");
        assert_eq!(parse_yen("¥1,234,000"), Some(1234000));
        assert_eq!(parse_yen("¥1234,000"), None);
        assert_eq!(parse_yen("1,000"), None);
    }

    #[test]
    fn test_parse_yen_rejects_leading_zeros() {
        assert_eq!(parse_yen("¥0"), Some(0));
        assert_eq!(parse_yen("¥0,000"), None);
        assert_eq!(parse_yen("¥01"), None);
        assert_eq!(parse_yen("¥001,000"), None);
    }

    proptest! {
        #[test]
        fn prop_yen_formatting_round_trips(amount in any::<u64>()) {
            prop_assert_eq!(parse_yen(&format_yen(amount)), Some(amount));
        }
    }

    #[test]
    fn test_confidence_rounding() {
        assert_eq!(format_confidence(Some(0.92)), "信頼度: 92%");
        assert_eq!(format_confidence(Some(0.956)), "信頼度: 96%");
        assert_eq!(format_confidence(Some(1.0)), "信頼度: 100%");
        assert_eq!(format_confidence(None), "");
    }

    #[test]
    fn test_contract_view_matches_response_fields() {
        let view = ContractView::from_contract(&sample_contract());
        assert_eq!(view.confidence, "信頼度: 92%");
        assert_eq!(view.holder, "山田太郎");
        assert_eq!(view.plot_number, "A-12");
        assert_eq!(view.contract_date, "2020-04-01");
        assert_eq!(view.perpetual_lease_fee, "¥300,000");
        assert_eq!(view.management_fee, "¥5,000 (年次)");
    }

    #[test]
    fn test_missing_fees_render_empty() {
        let contract = ContractData {
            perpetual_lease_fee: None,
            management_fee: None,
            management_fee_cycle: String::new(),
            ..sample_contract()
        };
        let view = ContractView::from_contract(&contract);
        assert_eq!(view.perpetual_lease_fee, "");
        assert_eq!(view.management_fee, "");

        let cycle_only = ContractData {
            management_fee: None,
            ..sample_contract()
        };
        assert_eq!(ContractView::from_contract(&cycle_only).management_fee, "(年次)");
    }

    #[test]
    fn test_checklist_branches_and_numbering() {
        let restricted = InheritanceChecklist {
            required_documents: vec!["戸籍謄本".to_string(), "同意書".to_string(), "戸籍謄本".to_string()],
            can_transfer: false,
            notes: "親族外への承継には管理者の許可が必要です".to_string(),
        };
        let view = ChecklistView::from_checklist(&restricted);
        assert_eq!(view.branch, ChecklistBranch::Restricted);
        assert_eq!(view.notes, restricted.notes);
        let numbered: Vec<(usize, &str)> = view.documents.iter().map(|d| (d.number, d.title.as_str())).collect();
        assert_eq!(numbered, vec![(1, "戸籍謄本"), (2, "同意書"), (3, "戸籍謄本")]);

        let rendered = view.to_string();
        assert!(rendered.starts_with("× 名義変更に制限があります"));
        assert!(rendered.contains("親族外への承継には管理者の許可が必要です"));
        assert!(rendered.contains("  3. 戸籍謄本"));

        let ok = ChecklistView::from_checklist(&InheritanceChecklist {
            can_transfer: true,
            ..restricted
        });
        assert_eq!(ok.branch, ChecklistBranch::Transferable);
        assert!(ok.to_string().starts_with("● 名義変更 可能です"));
    }

    #[test]
    fn test_workflow_view_upload_area() {
        let mut state = WorkflowState::new();
        let view = WorkflowView::from_state(&state);
        assert!(view.shows_upload());
        assert!(!view.check_enabled);
        assert!(view.relationships[0].selected);

        state.contract = Some(sample_contract());
        state.relationship = HeirRelationship::Child;
        let view = WorkflowView::from_state(&state);
        assert!(!view.shows_upload());
        assert!(view.check_enabled);
        assert!(view.relationships.iter().any(|c| c.selected && c.value == HeirRelationship::Child));
        assert!(view.to_string().contains("(*) 子への承継 [child]"));
    }
}
