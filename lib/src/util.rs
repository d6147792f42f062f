use crate::constants::TRANS_ID_LEN;
use crate::header::TransId;
use rand::prelude::*;
use std::fmt::Write as _;

pub fn print_bytes(buf: &[u8], separator: &str, row_width: usize) -> String {
    let mut hex = String::new();
    buf.iter().enumerate().for_each(|(x, y)| {
        let _ = write!(hex, "{:02X}", y);
        if (x + 1) % row_width == 0 {
            hex.push('\n');
        } else {
            hex.push_str(separator);
        }
    });

    hex
}

pub fn new_trans_id() -> TransId {
    let mut trans_id = [0u8; TRANS_ID_LEN];
    rand::thread_rng().fill_bytes(&mut trans_id);
    trans_id
}

// 向上取整到4的倍数
pub fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

// 400 -> class 4, number 0
pub fn pack_error_code(code: u16) -> u16 {
    let class = code / 100;
    let number = code % 100;

    (class & 0x07) << 8 | number
}

pub fn unpack_error_code(code: u16) -> u16 {
    let class = (code >> 8) & 0x07;
    let number = code & 0x00ff;

    class * 100 + number
}
