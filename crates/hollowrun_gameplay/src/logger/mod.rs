//! Логирование через подменяемый printer
//!
//! Ядро не знает, куда хост выводит журнал: консоль движка, файл или
//! встроенный overlay. Хост ставит свой [`LogPrinter`] один раз при
//! старте; headless режим довольствуется stdout. Сообщения ниже
//! установленного уровня отбрасываются до форматирования.

use once_cell::sync::Lazy;
use std::sync::Mutex;

static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));
static LOGGER_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Приёмник отформатированных сообщений (реализуется хостом)
pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn set_logger(printer: Box<dyn LogPrinter>) {
    *LOGGER.lock().unwrap() = Some(printer);
}

pub fn set_log_level(level: LogLevel) {
    *LOGGER_LEVEL.lock().unwrap() = level;
}

/// Ставит stdout-printer, если хост ещё не поставил свой.
/// Повторные вызовы — no-op, установленный printer не трогаем.
pub fn init_logger() {
    let mut slot = LOGGER.lock().unwrap();
    if slot.is_none() {
        *slot = Some(Box::new(ConsoleLogger));
    }
}

fn dispatch(level: LogLevel, message: &str) {
    if level < *LOGGER_LEVEL.lock().unwrap() {
        return;
    }
    // Timestamp добавляем здесь, printer хоста получает готовую строку
    if let Some(printer) = LOGGER.lock().unwrap().as_ref() {
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        printer.log(level, &format!("[{timestamp}] {message}"));
    }
}

macro_rules! level_fns {
    ($($name:ident => $level:ident),* $(,)?) => {
        $(
            pub fn $name(message: &str) {
                dispatch(LogLevel::$level, message);
            }
        )*
    };
}

level_fns! {
    log_debug => Debug,
    log_info => Info,
    log_warning => Warning,
    log_error => Error,
}

/// Printer по умолчанию для headless запусков
pub struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}
