//! 问卷输入模型
//!
//! 前端提交的问卷 JSON 结构，所有可选字段都有默认值。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 默认问卷标题
pub const DEFAULT_SURVEY_TITLE: &str = "Exam converted from PDF";

/// 默认题目文本
pub const DEFAULT_QUESTION_TEXT: &str = "Untitled question";

/// 问卷解析错误
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SurveyParseError {
    /// 请求体为空
    #[error("No data received")]
    Empty,

    /// 对象中缺少 questions 字段
    #[error("Request body must contain a \"questions\" list")]
    MissingQuestions,

    /// 根节点既不是对象也不是数组
    #[error("Request body must be a JSON object or a list of questions")]
    InvalidRoot,

    /// 字段类型不符
    #[error("Invalid questionnaire: {0}")]
    Invalid(String),
}

/// 问卷请求
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub survey_title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub survey_description: String,

    pub questions: Vec<Question>,
}

impl QuestionnaireRequest {
    /// 从原始 JSON 值构建请求
    ///
    /// 兼容旧版本：根节点为数组时直接视为题目列表。
    /// 对象缺少 `questions` 字段时直接报错，不做猜测。
    pub fn from_value(value: Value) -> Result<Self, SurveyParseError> {
        match value {
            Value::Null => Err(SurveyParseError::Empty),
            Value::Object(ref map) if map.is_empty() => Err(SurveyParseError::Empty),
            Value::Object(ref map) if !map.contains_key("questions") => {
                Err(SurveyParseError::MissingQuestions)
            }
            Value::Object(_) => serde_json::from_value(value)
                .map_err(|e| SurveyParseError::Invalid(e.to_string())),
            Value::Array(ref items) if items.is_empty() => Err(SurveyParseError::Empty),
            Value::Array(_) => {
                let questions: Vec<Question> = serde_json::from_value(value)
                    .map_err(|e| SurveyParseError::Invalid(e.to_string()))?;
                Ok(Self {
                    questions,
                    ..Default::default()
                })
            }
            _ => Err(SurveyParseError::InvalidRoot),
        }
    }

    /// 从请求体字节解析
    pub fn from_slice(body: &[u8]) -> Result<Self, SurveyParseError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(SurveyParseError::Empty);
        }
        let value: Value =
            serde_json::from_slice(body).map_err(|e| SurveyParseError::Invalid(e.to_string()))?;
        Self::from_value(value)
    }

    /// 解析后的问卷标题（为空时使用默认值）
    pub fn resolved_title(&self) -> &str {
        if self.survey_title.is_empty() {
            DEFAULT_SURVEY_TITLE
        } else {
            &self.survey_title
        }
    }
}

/// 单个题目
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// 题号，允许字符串或数字
    #[serde(default, deserialize_with = "string_or_number")]
    pub question_number: Option<String>,

    #[serde(default)]
    pub question_text: Option<String>,

    #[serde(default)]
    pub question_type: Option<QuestionType>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,

    #[serde(default)]
    pub linear_scale: Option<LinearScale>,
}

impl Question {
    pub fn text(&self) -> &str {
        self.question_text.as_deref().unwrap_or(DEFAULT_QUESTION_TEXT)
    }

    pub fn kind(&self) -> QuestionType {
        self.question_type.clone().unwrap_or_default()
    }

    /// 组合题目标题
    ///
    /// `position` 为题目在输入序列中的 0 基位置，题号为空时使用 `position + 1`。
    pub fn title(&self, position: usize) -> String {
        let text = self.text();
        match self.question_number.as_deref() {
            Some(number) if !number.trim().is_empty() => {
                format!("{}. {}", number, text).trim().to_string()
            }
            _ => format!("{}. {}", position + 1, text).trim().to_string(),
        }
    }
}

/// 线性量表设置
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinearScale {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub min_label: Option<String>,
    pub max_label: Option<String>,
}

/// 题目类型
///
/// 未识别的类型保留原始字符串，翻译时按简答题处理。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum QuestionType {
    #[default]
    ShortAnswer,
    Essay,
    MultipleChoice,
    Checkbox,
    Dropdown,
    LinearScale,
    MultipleChoiceGrid,
    CheckboxGrid,
    Unrecognized(String),
}

impl From<String> for QuestionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SHORT_ANSWER" => Self::ShortAnswer,
            "ESSAY" => Self::Essay,
            "MULTIPLE_CHOICE" => Self::MultipleChoice,
            "CHECKBOX" => Self::Checkbox,
            "DROPDOWN" => Self::Dropdown,
            "LINEAR_SCALE" => Self::LinearScale,
            "MULTIPLE_CHOICE_GRID" => Self::MultipleChoiceGrid,
            "CHECKBOX_GRID" => Self::CheckboxGrid,
            _ => Self::Unrecognized(value),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "questionNumber must be a string or number, got {}",
            other
        ))),
    }
}
