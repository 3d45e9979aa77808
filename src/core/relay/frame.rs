//! Transport-neutral frame representation.
//!
//! The client leg is an axum socket and the upstream leg a tokio-tungstenite
//! socket. Both have their own `Message` type; [`RelayMessage`] maps each onto
//! a common [`Frame`] so the pump can forward between them.

use axum::extract::ws::{self as axum_ws, Message as AxumMessage};
use bytes::Bytes;
use tokio_tungstenite::tungstenite::Message as TungsteniteMessage;
use tokio_tungstenite::tungstenite::protocol::CloseFrame as TungsteniteCloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

/// Close status sent when a leg fails without a close handshake.
pub const CLOSE_INTERNAL_ERROR: u16 = 1011;

/// Close status and reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Whether `code` may appear in a close frame on the wire.
    ///
    /// 1005, 1006 and 1015 are reserved for local reporting and must never be
    /// sent.
    pub fn is_sendable(&self) -> bool {
        matches!(self.code, 1000..=1003 | 1007..=1014 | 3000..=4999)
    }
}

/// A single WebSocket frame, independent of the socket library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Bytes),
    Close(Option<CloseInfo>),
    /// Ping, pong or raw frames; answered by the socket layer, never relayed
    Control,
}

/// Conversion between a socket library's message type and [`Frame`].
pub trait RelayMessage: Sized {
    fn into_frame(self) -> Frame;

    /// `None` for [`Frame::Control`].
    fn from_frame(frame: Frame) -> Option<Self>;
}

impl RelayMessage for AxumMessage {
    fn into_frame(self) -> Frame {
        match self {
            AxumMessage::Text(text) => Frame::Text(text.as_str().to_owned()),
            AxumMessage::Binary(data) => Frame::Binary(data),
            AxumMessage::Close(close) => Frame::Close(close.map(|c| CloseInfo {
                code: c.code,
                reason: c.reason.as_str().to_owned(),
            })),
            AxumMessage::Ping(_) | AxumMessage::Pong(_) => Frame::Control,
        }
    }

    fn from_frame(frame: Frame) -> Option<Self> {
        match frame {
            Frame::Text(text) => Some(AxumMessage::Text(text.into())),
            Frame::Binary(data) => Some(AxumMessage::Binary(data)),
            Frame::Close(info) => Some(AxumMessage::Close(info.map(|i| axum_ws::CloseFrame {
                code: i.code,
                reason: i.reason.into(),
            }))),
            Frame::Control => None,
        }
    }
}

impl RelayMessage for TungsteniteMessage {
    fn into_frame(self) -> Frame {
        match self {
            TungsteniteMessage::Text(text) => Frame::Text(text.as_str().to_owned()),
            TungsteniteMessage::Binary(data) => Frame::Binary(data),
            TungsteniteMessage::Close(close) => Frame::Close(close.map(|c| CloseInfo {
                code: u16::from(c.code),
                reason: c.reason.as_str().to_owned(),
            })),
            TungsteniteMessage::Ping(_)
            | TungsteniteMessage::Pong(_)
            | TungsteniteMessage::Frame(_) => Frame::Control,
        }
    }

    fn from_frame(frame: Frame) -> Option<Self> {
        match frame {
            Frame::Text(text) => Some(TungsteniteMessage::text(text)),
            Frame::Binary(data) => Some(TungsteniteMessage::Binary(data)),
            Frame::Close(info) => Some(TungsteniteMessage::Close(info.map(|i| {
                TungsteniteCloseFrame {
                    code: CloseCode::from(i.code),
                    reason: i.reason.into(),
                }
            }))),
            Frame::Control => None,
        }
    }
}
