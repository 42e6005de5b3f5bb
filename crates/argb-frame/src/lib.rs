//! # argb-frame
//!
//! ARGB コントローラとのシリアル通信におけるフレーミング層。
//!
//! バイトストリームを区切り文字 (`0x00`) で分割し、COBS で復元、
//! CRC-32 で検証するまでを担当する。ペイロードの中身（Protobuf）は扱わない。
//!
//! ## Wire Format
//!
//! ```text
//! [cobs( payload || crc32_le(payload) )][0x00]
//!
//! crc32: width=32, poly=0x04C11DB7, refin=true, refout=true,
//!        init=0xFFFFFFFF, xorout=0xFFFFFFFF
//! ```
//!
//! ## 受信の流れ
//!
//! ```text
//! bytes ─► PacketAssembler (区切り検出) ─► cobs::decode ─► crc32 検証 ─► payload
//! ```
//!
//! ## 送信の流れ
//!
//! ```text
//! payload ─► crc32 付加 ─► cobs::encode ─► [0x00]
//! ```

#![no_std]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod assembler;
pub mod cobs;
pub mod crc;
pub mod error;
pub mod hexdump;
pub mod packet;

pub use assembler::{AssemblerEvent, PacketAssembler};
pub use crc::{crc32, Crc32};
pub use error::FrameError;
pub use hexdump::HexDump;
pub use packet::{open, seal, seal_frame};

/// フレーム区切り文字（COBS の出力には決して現れない）
pub const DELIMITER: u8 = 0x00;

/// フレーム末尾に付く CRC-32 のバイト数（リトルエンディアン）
pub const CHECKSUM_LEN: usize = 4;

/// 有効なフレームの最小長（区切り文字間のバイト数）
///
/// CRC の 4 バイトに加えて最低 1 バイトの COBS コードが必要。
/// これ未満のフレームはデコードせずに破棄する。
pub const MIN_FRAME_LEN: usize = CHECKSUM_LEN + 1;

/// 受信フレームの最大長のデフォルト値
pub const DEFAULT_MAX_FRAME_LEN: usize = 512;
