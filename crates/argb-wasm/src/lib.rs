//! # argb-wasm
//!
//! wasm-bindgen エクスポート：ブラウザ（Web Serial API）から呼び出す公開 API。
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import { ArgbClient, init_panic_hook } from '../argb-wasm-pkg/argb_wasm';
//!
//! // パニック時のスタックトレースを有効化（開発時）
//! init_panic_hook();
//!
//! const port = await navigator.serial.requestPort();
//! await port.open({ baudRate: 115200 });
//! const client = new ArgbClient('{"name":"strip-1"}');
//!
//! // 受信チャンクを処理し、イベント (JSON 文字列) を受け取る
//! for (const json of client.receive(chunk)) {
//!     const event = JSON.parse(json);
//!     if (event.type === "ready") {
//!         client.setLight(0, 0, 6, 0xFFFFFF, 0x0000FF, 0x05050505);
//!         client.commit(3000);
//!     }
//! }
//!
//! // 送信待ちのバイト列をポートへ書き込む
//! await writer.write(client.takeOutgoing());
//! ```

use wasm_bindgen::prelude::*;

pub mod client;
pub mod events;

pub use client::ArgbClient;
pub use events::EventCollector;

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 開発時に必ず呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// ペイロードを送信可能なフレーム（CRC + COBS + 区切り文字）に変換する
///
/// テスト・デバッグ用。デバイス側のエミュレータからも使える。
#[wasm_bindgen(js_name = "sealFrame")]
pub fn seal_frame(payload: &[u8]) -> js_sys::Uint8Array {
    let frame = argb_frame::seal_frame(payload);
    let arr = js_sys::Uint8Array::new_with_length(frame.len() as u32);
    arr.copy_from(&frame);
    arr
}
