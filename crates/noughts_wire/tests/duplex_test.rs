//! Frames crossing an in-memory duplex stream.

use noughts_wire::{ErrorCode, Message, WireErrorKind, WireReader, WireWriter};
use tokio::io::{AsyncWriteExt, BufReader};

#[tokio::test]
async fn test_long_name_crosses_small_buffer() {
    let (client, server) = tokio::io::duplex(8);
    let name: String = std::iter::repeat("Ada Lovelace ").take(200).collect();
    let expected = Message::Hello {
        session: 0,
        name: name.clone(),
    };

    let sent = expected.clone();
    let writer_task = tokio::spawn(async move {
        let mut writer = WireWriter::new(client);
        writer.send(&sent).await.unwrap();
    });

    let mut reader = WireReader::new(BufReader::new(server));
    assert_eq!(reader.read_message().await.unwrap(), expected);
    writer_task.await.unwrap();
}

#[tokio::test]
async fn test_closed_stream_mid_frame_is_truncated() {
    let (mut client, server) = tokio::io::duplex(64);
    // Error frame cut off inside its session id.
    client.write_all(&[8, 0, 0]).await.unwrap();
    drop(client);

    let mut reader = WireReader::new(server);
    let err = reader.read_message().await.unwrap_err();
    assert_eq!(err.kind(), &WireErrorKind::Truncated);
    assert!(err.is_connection_failure());
}

#[tokio::test]
async fn test_both_directions() {
    let (client, server) = tokio::io::duplex(64);
    let (client_read, client_write) = tokio::io::split(client);
    let (server_read, server_write) = tokio::io::split(server);
    let mut client_writer = WireWriter::new(client_write);
    let mut client_reader = WireReader::new(client_read);
    let mut server_writer = WireWriter::new(server_write);
    let mut server_reader = WireReader::new(server_read);

    client_writer
        .send(&Message::Action {
            session: 10001,
            mv: "1-1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(
        server_reader.read_message().await.unwrap(),
        Message::Action {
            session: 10001,
            mv: "1-1".to_string()
        }
    );

    let reply = Message::Error {
        session: 10001,
        code: ErrorCode::CELL_OCCUPIED,
        message: "Invalid move, there is already a piece in that position".to_string(),
    };
    server_writer.send(&reply).await.unwrap();
    assert_eq!(client_reader.read_message().await.unwrap(), reply);
}
