//! Контракты (DTO) синхронизации каталога, общие для клиента и сервиса импорта

pub mod usecases;
