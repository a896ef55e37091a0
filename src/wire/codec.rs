use super::{Direction, Wire};

/// Кодек одного значения wire-формата.
///
/// Каждый тип реализует три явных операции вместо одной функции,
/// ветвящейся по направлению потока. [`WireCodec::transfer`] выбирает
/// нужную по [`Wire::direction`], так что обход таблицы полей остаётся
/// одним и тем же для всех направлений.
///
/// Ошибки не возвращаются: кодек выставляет статус потока через
/// [`Wire::fail`] и сам ничего не делает, если статус уже выставлен.
/// `decode` меняет значение только если оно прочитано целиком.
pub trait WireCodec {
    /// Пишет значение в поток.
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    );

    /// Читает значение из потока на место `self`.
    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    );

    /// Освобождает выделенные при декодировании данные.
    ///
    /// Повторный вызов ничего не делает.
    fn free(&mut self) {}

    /// Выполняет операцию, соответствующую направлению потока.
    fn transfer(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        match wire.direction() {
            Direction::Encode => self.encode(wire),
            Direction::Decode => self.decode(wire),
            Direction::Free => self.free(),
        }
    }
}
