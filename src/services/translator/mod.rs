//! 问卷 → Google Forms 载荷转换
//!
//! 纯函数，不访问网络也不会失败：所有可选字段都有默认值。

pub mod payload;
pub mod types;

use tracing::{debug, warn};

pub use payload::*;
pub use types::*;

/// 网格题的固定列（从"非常同意"到"非常不同意"）
pub const GRID_COLUMNS: [&str; 5] = [
    "Strongly agree",
    "Agree",
    "Neutral",
    "Disagree",
    "Strongly disagree",
];

/// 线性量表默认下限
pub const DEFAULT_SCALE_LOW: i64 = 1;

/// 线性量表默认上限
pub const DEFAULT_SCALE_HIGH: i64 = 5;

/// 将问卷转换为 `forms.create` 与 `forms.batchUpdate` 的请求体
pub fn translate(survey: &QuestionnaireRequest) -> (FormCreationPayload, BatchUpdatePayload) {
    let form = FormCreationPayload {
        info: FormInfo {
            title: Some(survey.resolved_title().to_string()),
            description: None,
        },
    };

    let mut requests = Vec::with_capacity(survey.questions.len() + 1);

    // 描述只能通过 batchUpdate 设置，且不占用题目位置
    if !survey.survey_description.is_empty() {
        requests.push(RequestOp::UpdateFormInfo(UpdateFormInfo {
            info: FormInfo {
                title: None,
                description: Some(survey.survey_description.clone()),
            },
            update_mask: "description".to_string(),
        }));
    }

    let mut index = 0;
    for (position, question) in survey.questions.iter().enumerate() {
        let Some(kind) = item_kind(question) else {
            warn!(
                "Dropping grid question without options: position={}",
                position
            );
            continue;
        };

        requests.push(RequestOp::CreateItem(CreateItem {
            item: Item {
                title: question.title(position),
                kind,
            },
            location: Location { index },
        }));
        index += 1;
    }

    (form, BatchUpdatePayload { requests })
}

/// 根据题目类型生成表单项
///
/// 选项为空的网格题返回 `None`；选项为空的选择题退化为简答题。
fn item_kind(question: &Question) -> Option<ItemKind> {
    let options = &question.options;

    let kind = match question.kind() {
        QuestionType::MultipleChoice if !options.is_empty() => {
            choice(ChoiceType::Radio, options)
        }
        QuestionType::Checkbox if !options.is_empty() => choice(ChoiceType::Checkbox, options),
        QuestionType::Dropdown if !options.is_empty() => choice(ChoiceType::DropDown, options),
        QuestionType::LinearScale => {
            let scale = question.linear_scale.clone().unwrap_or_default();
            QuestionKind::ScaleQuestion(ScaleQuestion {
                low: scale.min.unwrap_or(DEFAULT_SCALE_LOW),
                high: scale.max.unwrap_or(DEFAULT_SCALE_HIGH),
                low_label: scale.min_label.unwrap_or_default(),
                high_label: scale.max_label.unwrap_or_default(),
            })
        }
        QuestionType::MultipleChoiceGrid => return grid(ChoiceType::Radio, options),
        QuestionType::CheckboxGrid => return grid(ChoiceType::Checkbox, options),
        QuestionType::Essay => QuestionKind::TextQuestion(TextQuestion { paragraph: true }),
        QuestionType::Unrecognized(ref name) => {
            debug!("Unrecognized question type {:?}, using SHORT_ANSWER", name);
            short_answer()
        }
        QuestionType::ShortAnswer
        | QuestionType::MultipleChoice
        | QuestionType::Checkbox
        | QuestionType::Dropdown => short_answer(),
    };

    Some(ItemKind::QuestionItem(QuestionItem {
        question: FormQuestion {
            required: false,
            kind,
        },
    }))
}

fn choice(choice_type: ChoiceType, options: &[String]) -> QuestionKind {
    QuestionKind::ChoiceQuestion(ChoiceQuestion::new(choice_type, options.iter().cloned()))
}

fn short_answer() -> QuestionKind {
    QuestionKind::TextQuestion(TextQuestion { paragraph: false })
}

fn grid(column_type: ChoiceType, rows: &[String]) -> Option<ItemKind> {
    if rows.is_empty() {
        return None;
    }

    Some(ItemKind::QuestionGroupItem(QuestionGroupItem {
        questions: rows
            .iter()
            .map(|row| GroupRow {
                required: false,
                row_question: RowQuestion { title: row.clone() },
            })
            .collect(),
        grid: Grid {
            columns: ChoiceQuestion::new(column_type, GRID_COLUMNS),
        },
    }))
}
