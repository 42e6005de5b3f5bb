//! 送信コマンドの構築
//!
//! 色やアニメーション値をファームウェアが期待する 32 bit 形式に詰めて
//! `Request` を組み立てる。
//!
//! ```text
//! rgb   = (r << 16) | (g << 8) | b
//! ahds  = (attack << 24) | (hold << 16) | (decay << 8) | sustain
//! range = (start << 16) | end
//! ```

use alloc::vec::Vec;

use prost::Message as _;

use crate::messages::{request, CommitTransaction, Request, SetLight};

/// 24 bit カラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const fn packed(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub const fn from_packed(value: u32) -> Self {
        Rgb {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }
}

/// エンベロープ（attack / hold / decay / sustain）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ahds {
    pub attack: u8,
    pub hold: u8,
    pub decay: u8,
    pub sustain: u8,
}

impl Ahds {
    pub const fn new(attack: u8, hold: u8, decay: u8, sustain: u8) -> Self {
        Ahds {
            attack,
            hold,
            decay,
            sustain,
        }
    }

    pub const fn packed(self) -> u32 {
        (self.attack as u32) << 24
            | (self.hold as u32) << 16
            | (self.decay as u32) << 8
            | self.sustain as u32
    }

    pub const fn from_packed(value: u32) -> Self {
        Ahds {
            attack: (value >> 24) as u8,
            hold: (value >> 16) as u8,
            decay: (value >> 8) as u8,
            sustain: value as u8,
        }
    }
}

/// SetLight の引数
///
/// 代替色を指定しない場合は主色と同じ値を送る。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetLightCommand {
    pub id: u32,
    pub start: u16,
    pub end: u16,
    pub start_color: Rgb,
    pub end_color: Rgb,
    pub start_color_alt: Rgb,
    pub end_color_alt: Rgb,
    pub ahds: Ahds,
}

impl SetLightCommand {
    pub fn new(id: u32, start: u16, end: u16, start_color: Rgb, end_color: Rgb, ahds: Ahds) -> Self {
        SetLightCommand {
            id,
            start,
            end,
            start_color,
            end_color,
            start_color_alt: start_color,
            end_color_alt: end_color,
            ahds,
        }
    }

    pub fn with_alt_colors(mut self, start_color_alt: Rgb, end_color_alt: Rgb) -> Self {
        self.start_color_alt = start_color_alt;
        self.end_color_alt = end_color_alt;
        self
    }

    /// `(start << 16) | end`
    pub fn packed_range(&self) -> u32 {
        (self.start as u32) << 16 | self.end as u32
    }

    pub fn to_message(&self) -> SetLight {
        SetLight {
            id: self.id,
            range: self.packed_range(),
            start_color: self.start_color.packed(),
            end_color: self.end_color.packed(),
            start_color_alt: self.start_color_alt.packed(),
            end_color_alt: self.end_color_alt.packed(),
            ahds: self.ahds.packed(),
        }
    }
}

/// host → device のコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetLight(SetLightCommand),
    /// それまでの SetLight を `timestamp_delta` 後に適用する
    Commit { timestamp_delta: u32 },
    CurrentTimeRequest,
}

impl Command {
    pub fn to_request(&self) -> Request {
        let payload = match self {
            Command::SetLight(cmd) => request::Payload::SetLight(cmd.to_message()),
            Command::Commit { timestamp_delta } => {
                request::Payload::CommitTransaction(CommitTransaction {
                    timestamp: *timestamp_delta,
                })
            }
            Command::CurrentTimeRequest => request::Payload::CurrentTimeRequest(true),
        };
        Request {
            payload: Some(payload),
        }
    }

    /// Protobuf バイト列にエンコードする（同じコマンドは常に同じバイト列）
    pub fn encode_to_bytes(&self) -> Vec<u8> {
        self.to_request().encode_to_vec()
    }

    /// ログ用の短い名前
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetLight(_) => "set_light",
            Command::Commit { .. } => "commit",
            Command::CurrentTimeRequest => "current_time_request",
        }
    }
}

impl From<SetLightCommand> for Command {
    fn from(cmd: SetLightCommand) -> Self {
        Command::SetLight(cmd)
    }
}
