//! Session tests against a fake launcher on a real Unix socket.

mod support;
