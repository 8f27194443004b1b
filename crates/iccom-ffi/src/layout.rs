use iccom_frame as frame;

use crate::error;

/// 0 if `channel` is a prime or loopback shadow channel, else `-EINVAL`.
#[no_mangle]
pub extern "C" fn iccom_channel_verify(channel: i64) -> i32 {
    crate::ffi_boundary(-libc::EFAULT, || {
        error::clear_error_state();
        let Ok(channel) = u32::try_from(channel) else {
            return error::set_invalid_argument(format!("channel {channel} is negative or too large"));
        };
        match frame::verify(channel) {
            Ok(()) => 0,
            Err(err) => error::map_frame_error(&err),
        }
    })
}

#[no_mangle]
pub extern "C" fn iccom_lun_cid_to_channel(lun: u32, cid: u32) -> u32 {
    frame::lun_cid_to_channel(lun, cid)
}

#[no_mangle]
pub extern "C" fn iccom_get_data_payload_offset() -> usize {
    frame::payload_offset()
}

#[no_mangle]
pub extern "C" fn iccom_get_required_buffer_size(data_size: usize) -> usize {
    crate::ffi_boundary(0, || frame::required_buffer_size(data_size))
}

#[no_mangle]
pub extern "C" fn iccom_get_max_payload_size() -> usize {
    frame::max_payload_size()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_exports_match_frame_crate() {
        assert_eq!(iccom_get_data_payload_offset(), 16);
        assert_eq!(iccom_get_required_buffer_size(3), 20);
        assert_eq!(iccom_get_max_payload_size(), 4096);
        assert_eq!(iccom_lun_cid_to_channel(1, 2), 130);
    }

    #[test]
    fn channel_verify_rejects_negative_and_out_of_range() {
        assert_eq!(iccom_channel_verify(0), 0);
        assert_eq!(iccom_channel_verify(0xFFFF), 0);
        assert_eq!(iccom_channel_verify(0x1_0000), -libc::EINVAL);
        assert_eq!(iccom_channel_verify(-1), -libc::EINVAL);
    }
}
