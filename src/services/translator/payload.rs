//! Google Forms API 请求载荷
//!
//! 字段名与 Forms API v1 的 JSON 表示一致（camelCase）。

use serde::{Deserialize, Serialize};

/// `forms.create` 请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormCreationPayload {
    pub info: FormInfo,
}

/// 表单信息
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `forms.batchUpdate` 请求体
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchUpdatePayload {
    pub requests: Vec<RequestOp>,
}

impl BatchUpdatePayload {
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// 创建题目的操作数量
    pub fn item_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|op| matches!(op, RequestOp::CreateItem(_)))
            .count()
    }
}

/// 批量更新中的单个操作
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestOp {
    UpdateFormInfo(UpdateFormInfo),
    CreateItem(CreateItem),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormInfo {
    pub info: FormInfo,
    pub update_mask: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateItem {
    pub item: Item,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub index: usize,
}

/// 表单项：单个题目或题目组（网格）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub title: String,
    #[serde(flatten)]
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    QuestionItem(QuestionItem),
    QuestionGroupItem(QuestionGroupItem),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionItem {
    pub question: FormQuestion,
}

/// 单个题目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormQuestion {
    pub required: bool,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionKind {
    ChoiceQuestion(ChoiceQuestion),
    ScaleQuestion(ScaleQuestion),
    TextQuestion(TextQuestion),
}

/// 选择方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChoiceType {
    Radio,
    Checkbox,
    DropDown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceQuestion {
    #[serde(rename = "type")]
    pub choice_type: ChoiceType,
    pub options: Vec<ChoiceOption>,
}

impl ChoiceQuestion {
    pub fn new<I, S>(choice_type: ChoiceType, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choice_type,
            options: values
                .into_iter()
                .map(|value| ChoiceOption {
                    value: value.into(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleQuestion {
    pub low: i64,
    pub high: i64,
    pub low_label: String,
    pub high_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextQuestion {
    pub paragraph: bool,
}

/// 网格题目组
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionGroupItem {
    pub questions: Vec<GroupRow>,
    pub grid: Grid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRow {
    pub required: bool,
    pub row_question: RowQuestion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowQuestion {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub columns: ChoiceQuestion,
}

/// `forms.create` 响应中需要的字段
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedForm {
    pub form_id: String,
    pub responder_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_item_wire_shape() {
        let op = RequestOp::CreateItem(CreateItem {
            item: Item {
                title: "1. Pick".to_string(),
                kind: ItemKind::QuestionItem(QuestionItem {
                    question: FormQuestion {
                        required: false,
                        kind: QuestionKind::ChoiceQuestion(ChoiceQuestion::new(
                            ChoiceType::DropDown,
                            ["a", "b"],
                        )),
                    },
                }),
            },
            location: Location { index: 0 },
        });

        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "createItem": {
                    "item": {
                        "title": "1. Pick",
                        "questionItem": {
                            "question": {
                                "required": false,
                                "choiceQuestion": {
                                    "type": "DROP_DOWN",
                                    "options": [{"value": "a"}, {"value": "b"}]
                                }
                            }
                        }
                    },
                    "location": {"index": 0}
                }
            })
        );
    }

    #[test]
    fn test_update_form_info_wire_shape() {
        let op = RequestOp::UpdateFormInfo(UpdateFormInfo {
            info: FormInfo {
                title: None,
                description: Some("desc".to_string()),
            },
            update_mask: "description".to_string(),
        });

        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "updateFormInfo": {
                    "info": {"description": "desc"},
                    "updateMask": "description"
                }
            })
        );
    }

    #[test]
    fn test_created_form_ignores_extra_fields() {
        let form: CreatedForm = serde_json::from_value(json!({
            "formId": "abc",
            "responderUri": "https://docs.google.com/forms/d/e/abc/viewform",
            "info": {"title": "t", "documentTitle": "t"},
            "revisionId": "00000001"
        }))
        .unwrap();
        assert_eq!(form.form_id, "abc");
        assert_eq!(form.responder_uri, "https://docs.google.com/forms/d/e/abc/viewform");
    }
}
