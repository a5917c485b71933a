//! Binary encoding of [`Message`], for running nodes in separate processes.
//!
//! Every frame starts with a tag byte and the round number as a big-endian
//! `i64`. Accept and Decide follow with the value; Promise follows with a
//! flag byte and, when set, the previously accepted proposal. Strings are a
//! big-endian `u32` length and UTF-8 bytes, at most [`MAX_VALUE_LEN`] long.

use super::message::*;
use super::proposal::Proposal;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::convert::TryFrom;
use thiserror::Error;

const TAG_PREPARE: u8 = 1;
const TAG_PROMISE: u8 = 2;
const TAG_ACCEPT: u8 = 3;
const TAG_DECIDE: u8 = 4;

/// Longest value either side will put in a frame.
pub const MAX_VALUE_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("value of {0} bytes exceeds the limit of {max}", max = MAX_VALUE_LEN)]
    ValueTooLarge(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("frame ended early")]
    UnexpectedEof,
    #[error("unknown message tag {0}")]
    UnknownTag(u8),
    #[error("invalid presence flag {0}")]
    InvalidFlag(u8),
    #[error("value is not valid UTF-8")]
    InvalidUtf8,
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),
    #[error("value length {0} exceeds the limit of {max}", max = MAX_VALUE_LEN)]
    ValueTooLarge(u32),
}

pub fn encode(message: &Message) -> Result<Bytes, EncodeError> {
    let mut buf = BytesMut::new();
    match message {
        Message::Prepare(m) => {
            buf.put_u8(TAG_PREPARE);
            buf.put_i64(m.number);
        }
        Message::Promise(m) => {
            buf.put_u8(TAG_PROMISE);
            buf.put_i64(m.number);
            match &m.highest_accepted {
                None => buf.put_u8(0),
                Some(p) => {
                    buf.put_u8(1);
                    buf.put_i64(p.number);
                    put_str(&mut buf, &p.value)?;
                }
            }
        }
        Message::Accept(m) => {
            buf.put_u8(TAG_ACCEPT);
            buf.put_i64(m.number);
            put_str(&mut buf, &m.value)?;
        }
        Message::Decide(m) => {
            buf.put_u8(TAG_DECIDE);
            buf.put_i64(m.number);
            put_str(&mut buf, &m.value)?;
        }
    }
    Ok(buf.freeze())
}

pub fn decode(mut buf: &[u8]) -> Result<Message, DecodeError> {
    let message = match get_u8(&mut buf)? {
        TAG_PREPARE => Message::Prepare(Prepare {
            number: get_i64(&mut buf)?,
        }),
        TAG_PROMISE => {
            let number = get_i64(&mut buf)?;
            let highest_accepted = match get_u8(&mut buf)? {
                0 => None,
                1 => Some(Proposal::new(get_i64(&mut buf)?, get_str(&mut buf)?)),
                flag => return Err(DecodeError::InvalidFlag(flag)),
            };
            Message::Promise(Promise {
                number,
                highest_accepted,
            })
        }
        TAG_ACCEPT => Message::Accept(Accept {
            number: get_i64(&mut buf)?,
            value: get_str(&mut buf)?,
        }),
        TAG_DECIDE => Message::Decide(Decide {
            number: get_i64(&mut buf)?,
            value: get_str(&mut buf)?,
        }),
        tag => return Err(DecodeError::UnknownTag(tag)),
    };
    if buf.has_remaining() {
        return Err(DecodeError::TrailingBytes(buf.remaining()));
    }
    Ok(message)
}

fn put_str(buf: &mut BytesMut, s: &str) -> Result<(), EncodeError> {
    let len = match u32::try_from(s.len()) {
        Ok(len) if s.len() <= MAX_VALUE_LEN => len,
        _ => return Err(EncodeError::ValueTooLarge(s.len())),
    };
    buf.put_u32(len);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn get_u8(buf: &mut &[u8]) -> Result<u8, DecodeError> {
    if buf.remaining() < 1 {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(buf.get_u8())
}

fn get_i64(buf: &mut &[u8]) -> Result<i64, DecodeError> {
    if buf.remaining() < 8 {
        return Err(DecodeError::UnexpectedEof);
    }
    Ok(buf.get_i64())
}

fn get_str(buf: &mut &[u8]) -> Result<String, DecodeError> {
    if buf.remaining() < 4 {
        return Err(DecodeError::UnexpectedEof);
    }
    let len = buf.get_u32();
    if len as usize > MAX_VALUE_LEN {
        return Err(DecodeError::ValueTooLarge(len));
    }
    let len = len as usize;
    if buf.remaining() < len {
        return Err(DecodeError::UnexpectedEof);
    }
    let value = String::from_utf8(buf[..len].to_vec()).map_err(|_| DecodeError::InvalidUtf8)?;
    buf.advance(len);
    Ok(value)
}
