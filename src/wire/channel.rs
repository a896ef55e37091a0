//! Каналы ввода-вывода, над которыми работает [`Wire`](super::Wire).
//!
//! Wire-поток не открывает и не закрывает файлы сам: он получает пару
//! функций чтения/записи в виде трейта [`Channel`]. Канал, не
//! поддерживающий одно из направлений, возвращает `ErrorKind::Unsupported`.

use std::{
    fs::File,
    io::{self, Cursor, Read, Write},
};

/// Пара функций чтения/записи, к которой привязан буфер потока.
pub trait Channel {
    /// Читает до `buf.len()` байт. `Ok(0)` означает конец данных.
    fn read_some(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize>;

    /// Пишет часть `buf`, возвращая число записанных байт.
    fn write_some(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize>;

    /// Сбрасывает внутренние буферы канала (если есть).
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn unsupported(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("channel does not support {what}"),
    )
}

impl Channel for File {
    fn read_some(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn write_some(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        Write::write(self, buf)
    }

    fn sync(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

impl Channel for Cursor<Vec<u8>> {
    fn read_some(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn write_some(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        Write::write(self, buf)
    }
}

impl Channel for Cursor<&[u8]> {
    fn read_some(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn write_some(
        &mut self,
        _buf: &[u8],
    ) -> io::Result<usize> {
        Err(unsupported("writing"))
    }
}

impl Channel for &[u8] {
    fn read_some(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn write_some(
        &mut self,
        _buf: &[u8],
    ) -> io::Result<usize> {
        Err(unsupported("writing"))
    }
}

impl Channel for Vec<u8> {
    fn read_some(
        &mut self,
        _buf: &mut [u8],
    ) -> io::Result<usize> {
        Err(unsupported("reading"))
    }

    fn write_some(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Адаптер «только чтение» для любого `Read`.
#[derive(Debug)]
pub struct Source<R>(pub R);

impl<R: Read> Channel for Source<R> {
    fn read_some(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        self.0.read(buf)
    }

    fn write_some(
        &mut self,
        _buf: &[u8],
    ) -> io::Result<usize> {
        Err(unsupported("writing"))
    }
}

/// Адаптер «только запись» для любого `Write`.
#[derive(Debug)]
pub struct Sink<W>(pub W);

impl<W: Write> Channel for Sink<W> {
    fn read_some(
        &mut self,
        _buf: &mut [u8],
    ) -> io::Result<usize> {
        Err(unsupported("reading"))
    }

    fn write_some(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}
