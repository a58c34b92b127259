//! Сверка выгрузки цен/остатков с каталогом и пакетное применение изменений
//! через задания импорта сервиса каталога.

pub mod shared;
pub mod system;
pub mod usecases;
