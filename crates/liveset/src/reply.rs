//! Reading typed values out of replies.
//!
//! AbletonOSC echoes the object indices of a query before the values, so
//! `/live/clip/get/name 1 2` answers `/live/clip/get/name 1 2 "Bass"`. Every
//! reader takes `skip`, the number of leading index values to step over.
//! [`query`] checks the echo first, so a reply meant for another object is
//! reported instead of read.

use liveproto::{OscArg, OscClient};

use crate::error::{LiveError, Result};

fn unexpected(address: &str, detail: String) -> LiveError {
    LiveError::UnexpectedReply {
        address: address.to_string(),
        detail,
    }
}

/// Query `address` and check that the reply echoes `args`.
pub(crate) async fn query(client: &OscClient, address: &str, args: &[OscArg]) -> Result<Vec<OscArg>> {
    let reply = client.query(address, args).await?;
    check_echo(address, args, &reply)?;
    Ok(reply)
}

/// The reply must start with the index values that were sent.
pub(crate) fn check_echo(address: &str, sent: &[OscArg], reply: &[OscArg]) -> Result<()> {
    let echoed = reply.get(..sent.len()).ok_or_else(|| {
        unexpected(
            address,
            format!("expected {} echoed index values, got {} values", sent.len(), reply.len()),
        )
    })?;

    for (want, got) in sent.iter().zip(echoed) {
        let same = match (want, got.as_int()) {
            (OscArg::Int(w), Some(g)) => *w == g,
            _ => want == got,
        };
        if !same {
            return Err(unexpected(
                address,
                format!("reply is for index {}, asked for {}", got, want),
            ));
        }
    }
    Ok(())
}

/// The value right after the echoed indices
pub(crate) fn value<'a>(address: &str, reply: &'a [OscArg], skip: usize) -> Result<&'a OscArg> {
    reply.get(skip).ok_or_else(|| {
        unexpected(
            address,
            format!("expected a value after {} index values, got {} values", skip, reply.len()),
        )
    })
}

pub(crate) fn int(address: &str, reply: &[OscArg], skip: usize) -> Result<i32> {
    let arg = value(address, reply, skip)?;
    arg.as_int()
        .ok_or_else(|| unexpected(address, format!("expected an integer, got {}", arg)))
}

/// Integer, accepting floats (truncated) and numeric strings as well
pub(crate) fn lenient_int(address: &str, reply: &[OscArg], skip: usize) -> Result<i32> {
    let arg = value(address, reply, skip)?;
    let truncate = |f: f32| f.is_finite().then_some(f as i32);
    arg.as_int()
        .or_else(|| arg.as_float().and_then(truncate))
        .or_else(|| {
            let text = arg.as_str()?.trim();
            text.parse::<i32>()
                .ok()
                .or_else(|| text.parse::<f32>().ok().and_then(truncate))
        })
        .ok_or_else(|| unexpected(address, format!("expected an integer, got {}", arg)))
}

pub(crate) fn float(address: &str, reply: &[OscArg], skip: usize) -> Result<f32> {
    let arg = value(address, reply, skip)?;
    arg.as_float()
        .ok_or_else(|| unexpected(address, format!("expected a number, got {}", arg)))
}

pub(crate) fn boolean(address: &str, reply: &[OscArg], skip: usize) -> Result<bool> {
    let arg = value(address, reply, skip)?;
    arg.as_bool()
        .ok_or_else(|| unexpected(address, format!("expected a boolean, got {}", arg)))
}

pub(crate) fn string(address: &str, reply: &[OscArg], skip: usize) -> Result<String> {
    let arg = value(address, reply, skip)?;
    arg.as_str()
        .map(str::to_string)
        .ok_or_else(|| unexpected(address, format!("expected a string, got {}", arg)))
}

/// Every value after the echoed indices, as strings
pub(crate) fn strings(address: &str, reply: &[OscArg], skip: usize) -> Result<Vec<String>> {
    reply
        .iter()
        .skip(skip)
        .map(|arg| {
            arg.as_str()
                .map(str::to_string)
                .ok_or_else(|| unexpected(address, format!("expected a string, got {}", arg)))
        })
        .collect()
}

/// Every value after the echoed indices, as floats
pub(crate) fn floats(address: &str, reply: &[OscArg], skip: usize) -> Result<Vec<f32>> {
    reply
        .iter()
        .skip(skip)
        .map(|arg| {
            arg.as_float()
                .ok_or_else(|| unexpected(address, format!("expected a number, got {}", arg)))
        })
        .collect()
}

/// An object index as an argument; Live has no negative indices.
pub(crate) fn index(name: &'static str, value: i32) -> Result<OscArg> {
    if value < 0 {
        return Err(LiveError::invalid(name, format!("{} is negative", value)));
    }
    Ok(OscArg::Int(value))
}

/// Reject `value` outside `range` before it goes on the wire.
pub(crate) fn check_range(
    name: &'static str,
    value: f32,
    range: std::ops::RangeInclusive<f32>,
) -> Result<()> {
    if value.is_nan() || !range.contains(&value) {
        return Err(LiveError::invalid(
            name,
            format!("{} is outside {}..={}", value, range.start(), range.end()),
        ));
    }
    Ok(())
}
