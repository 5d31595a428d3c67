use derive_new::new;
use serde::{Deserialize, Serialize};

/// Signer identity form owned by the host page
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignerForm {
    #[serde(default)]
    pub signer_name: String,
    #[serde(default)]
    pub credentials: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub terms_accepted: bool,
}

impl SignerForm {
    pub fn has_signer_name(&self) -> bool {
        !self.signer_name.trim().is_empty()
    }
}

/// Viewport placement of the drawing surface, as reported by layout
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, new)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, new)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    pub client_x: f32,
    pub client_y: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, new)]
#[serde(rename_all = "camelCase")]
pub struct Touch {
    pub identifier: i64,
    pub client_x: f32,
    pub client_y: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, new)]
#[serde(rename_all = "camelCase")]
pub struct TouchInput {
    /// Touch points that started, moved or lifted in this event
    #[serde(default)]
    pub changed_touches: Vec<Touch>,
    /// Touch points still on the surface after this event
    #[serde(default)]
    #[new(default)]
    pub touches: Vec<Touch>,
}

impl TouchInput {
    pub fn with_touches(mut self, touches: Vec<Touch>) -> Self {
        self.touches = touches;
        self
    }

    pub fn is_down(&self, identifier: i64) -> bool {
        self.touches.iter().any(|touch| touch.identifier == identifier)
    }
}

/// Raw input event delivered by the host, in viewport coordinates
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputEvent {
    PointerDown(PointerInput),
    PointerMove(PointerInput),
    PointerUp(PointerInput),
    TouchStart(TouchInput),
    TouchMove(TouchInput),
    TouchEnd(TouchInput),
    TouchCancel(TouchInput),
}

/// How a recorded session finishes
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SessionAction {
    #[default]
    Sign,
    Close,
}

/// A recorded capture session: surface layout, form state and the raw input
/// stream, ending in either a sign or a close action.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub surface: SurfaceRect,
    #[serde(default)]
    pub form: SignerForm,
    #[serde(default)]
    pub inputs: Vec<InputEvent>,
    #[serde(default)]
    pub action: SessionAction,
}
