//! Echo loop on one channel socket.
//!
//! A thread plays the ICCom target over TCP emulation (port == channel) and
//! sends a few messages; the socket echoes each one back.
//!
//! Run with:
//!   cargo run --example echo-server

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use iccom::frame::{check_frame, encode_frame, max_frame_size, payload_offset};
use iccom::socket::IccomConfig;
use iccom::transport::Binding;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let channel = u32::from(listener.local_addr()?.port());
    eprintln!("target listening, channel {channel}");

    let target = thread::spawn(
        move || -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            let (mut stream, _) = listener.accept()?;
            let mut buf = vec![0u8; max_frame_size()];
            for message in ["ping", "hello", "bye"] {
                let mut frame = bytes::BytesMut::new();
                encode_frame(message.as_bytes(), &mut frame);
                stream.write_all(&frame)?;

                let n = stream.read(&mut buf)?;
                let len = check_frame(&buf[..n])?;
                let reply = &buf[payload_offset()..payload_offset() + len];
                eprintln!("[target] sent {message:?}, got {:?}", String::from_utf8_lossy(reply));
            }
            Ok(())
        },
    );

    let config = IccomConfig::default().with_binding(Binding::tcp("127.0.0.1"));
    let mut socket = config.socket(channel)?;
    socket.open()?;
    socket.set_debug(true);

    // The target hangs up after its last message; pull then reports 0.
    while socket.pull()? > 0 {
        let payload = socket.input().to_vec();
        eprintln!("[socket] echoing {} bytes", payload.len());
        socket.append(&payload).flush()?;
    }
    socket.close();

    target
        .join()
        .map_err(|_| "target thread panicked")?
        .map_err(|err| err.to_string())?;
    Ok(())
}
