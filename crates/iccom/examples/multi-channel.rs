//! Two channel sockets side by side.
//!
//! Each channel gets its own TCP-emulated target (port == channel) that
//! answers with the upper-cased request.
//!
//! Run with:
//!   cargo run --example multi-channel

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use iccom::frame::{check_frame, encode_frame, max_frame_size, payload_offset};
use iccom::socket::IccomConfig;
use iccom::transport::Binding;

type TargetResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn spawn_target() -> std::io::Result<(u32, JoinHandle<TargetResult>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let channel = u32::from(listener.local_addr()?.port());

    let handle = thread::spawn(move || -> TargetResult {
        let (mut stream, _) = listener.accept()?;
        let mut buf = vec![0u8; max_frame_size()];
        let n = stream.read(&mut buf)?;
        let len = check_frame(&buf[..n])?;
        let request = &buf[payload_offset()..payload_offset() + len];
        eprintln!(
            "[target {channel}] request {:?}",
            String::from_utf8_lossy(request)
        );

        let mut reply = bytes::BytesMut::new();
        encode_frame(&request.to_ascii_uppercase(), &mut reply);
        stream.write_all(&reply)?;
        Ok(())
    });
    Ok((channel, handle))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (command_ch, command_target) = spawn_target()?;
    let (data_ch, data_target) = spawn_target()?;

    let config = IccomConfig::default().with_binding(Binding::tcp("127.0.0.1"));
    let mut command = config.socket(command_ch)?;
    let mut data = config.socket(data_ch)?;
    command.open()?;
    data.open()?;
    command.set_read_timeout(2000)?;
    data.set_read_timeout(2000)?;

    command.append(b"{\"action\":\"ping\"}").flush()?;
    data.append(b"bulk ").append(b"payload ").append(b"bytes").flush()?;

    for socket in [&mut command, &mut data] {
        if socket.pull()? == 0 {
            eprintln!("[ch {}] no reply", socket.channel());
            continue;
        }
        eprintln!(
            "[ch {}] reply {:?}",
            socket.channel(),
            String::from_utf8_lossy(socket.input())
        );
    }

    for target in [command_target, data_target] {
        target
            .join()
            .map_err(|_| "target thread panicked")?
            .map_err(|err| err.to_string())?;
    }
    Ok(())
}
