//! Interactive messages (lists and reply buttons) and the replies users send
//! back when they pick an option.

use serde::{Deserialize, Serialize};

/// Kind of interactive message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractiveType {
    List,
    Button,
}

/// Interactive content structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Interactive {
    #[serde(rename = "type")]
    pub kind: InteractiveType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<InteractiveHeader>,
    pub body: InteractiveText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<InteractiveText>,
    pub action: InteractiveAction,
}

impl Interactive {
    /// Creates a list message with a single untitled section
    pub fn new_list(
        header: impl Into<String>,
        body: impl Into<String>,
        button_text: impl Into<String>,
        rows: Vec<InteractiveRow>,
    ) -> Self {
        Self {
            kind: InteractiveType::List,
            header: Some(InteractiveHeader::text(header)),
            body: InteractiveText { text: body.into() },
            footer: None,
            action: InteractiveAction {
                button: Some(button_text.into()),
                sections: vec![InteractiveSection { title: None, rows }],
                buttons: Vec::new(),
            },
        }
    }

    /// Creates a message with up to three quick reply buttons
    pub fn new_buttons(body: impl Into<String>, buttons: Vec<ReplyButton>) -> Self {
        Self {
            kind: InteractiveType::Button,
            header: None,
            body: InteractiveText { text: body.into() },
            footer: None,
            action: InteractiveAction {
                button: None,
                sections: Vec::new(),
                buttons,
            },
        }
    }

    /// Returns why the message would be rejected by the platform, if it would
    pub fn check(&self) -> Result<(), String> {
        if self.body.text.trim().is_empty() {
            return Err("interactive body text is empty".into());
        }

        match self.kind {
            InteractiveType::List => {
                if self.action.button.as_deref().is_none_or(str::is_empty) {
                    return Err("list messages need a button text".into());
                }
                let rows: usize = self.action.sections.iter().map(|s| s.rows.len()).sum();
                if rows == 0 || rows > 10 {
                    return Err(format!("list messages need 1 to 10 rows, got {rows}"));
                }
            }
            InteractiveType::Button => {
                let buttons = self.action.buttons.len();
                if buttons == 0 || buttons > 3 {
                    return Err(format!(
                        "button messages need 1 to 3 buttons, got {buttons}"
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Interactive message header
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InteractiveHeader {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl InteractiveHeader {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InteractiveText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InteractiveAction {
    /// Text of the button opening a list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<InteractiveSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ReplyButton>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InteractiveSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub rows: Vec<InteractiveRow>,
}

/// Interactive row (list item)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InteractiveRow {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InteractiveRow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReplyButton {
    /// Always "reply"
    #[serde(rename = "type")]
    pub kind: String,
    pub reply: ButtonReply,
}

impl ReplyButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: "reply".into(),
            reply: ButtonReply {
                id: id.into(),
                title: title.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ButtonReply {
    pub id: String,
    pub title: String,
}

/// What a user picked on an interactive message, as received in webhooks
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InteractiveReply {
    /// button_reply or list_reply
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_reply: Option<ButtonReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_reply: Option<ListReply>,
}

impl InteractiveReply {
    /// Id of the selected button or row
    pub fn selected_id(&self) -> Option<&str> {
        self.button_reply
            .as_ref()
            .map(|reply| reply.id.as_str())
            .or_else(|| self.list_reply.as_ref().map(|reply| reply.id.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListReply {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
