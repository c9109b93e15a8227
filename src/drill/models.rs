use serde::{Deserialize, Serialize};

/// Question kind, carried on the wire as a one-letter tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    MultipleChoice,
    FillInBlank,
    DragAndDrop,
    MemoryGame,
    Picture,
    Other(String),
}

impl QuestionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MultipleChoice => "M",
            Self::FillInBlank => "F",
            Self::DragAndDrop => "D",
            Self::MemoryGame => "G",
            Self::Picture => "P",
            Self::Other(tag) => tag.as_str(),
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "M" => Self::MultipleChoice,
            "F" => Self::FillInBlank,
            "D" => Self::DragAndDrop,
            "G" => Self::MemoryGame,
            "P" => Self::Picture,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for QuestionType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<QuestionType> for String {
    fn from(kind: QuestionType) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub word_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub answer: serde_json::Value,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default, rename = "dragItems", alias = "drag_items")]
    pub drag_items: Vec<String>,
    #[serde(default, rename = "memoryCards", alias = "memory_cards")]
    pub memory_cards: Vec<serde_json::Value>,
    #[serde(default, rename = "pictureWord", alias = "picture_word")]
    pub picture_word: Vec<serde_json::Value>,
}

impl Question {
    /// Grouping key: the vocabulary id when the backend sends one, else the word text.
    pub fn word_key(&self) -> String {
        match self.word_id {
            Some(id) => format!("id:{id}"),
            None => format!("word:{}", self.word),
        }
    }

    /// Number of `_` placeholders in a fill-in pattern.
    pub fn blank_count(&self) -> usize {
        self.pattern
            .as_deref()
            .map(|p| p.chars().filter(|c| *c == '_').count())
            .unwrap_or(0)
    }
}

/// Vocabulary entry attached to a drill payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyWord {
    #[serde(default)]
    pub id: Option<i64>,
    pub word: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "signVideo", alias = "sign_video")]
    pub video: Option<String>,
}

/// Runtime-only grouping of a drill's questions by shared word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordGroup {
    pub word: String,
    pub word_id: Option<i64>,
    pub definition: Option<String>,
    pub image: Option<String>,
    pub sign_video: Option<String>,
    pub questions: Vec<Question>,
}

impl WordGroup {
    pub(crate) fn for_question(question: &Question) -> Self {
        Self {
            word: question.word.clone(),
            word_id: question.word_id,
            definition: None,
            image: None,
            sign_video: None,
            questions: Vec::new(),
        }
    }

    pub(crate) fn apply_vocabulary(&mut self, vocab: &VocabularyWord) {
        self.definition = vocab.definition.clone();
        self.image = vocab.image.clone();
        self.sign_video = vocab.video.clone();
    }
}
