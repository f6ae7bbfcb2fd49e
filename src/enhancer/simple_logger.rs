use crate::{
    action::StoreAction,
    enhancer::{CreateStoreFn, StoreEnhancer},
    error::Result,
    BoxedReducer, Reducer, Reduction, StoreRef,
};
use std::{fmt::Debug, rc::Rc};

/// The level at which [SimpleLoggerEnhancer] writes its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::Level::Trace,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
        }
    }
}

/// Logs the previous state, the action and the next state of every
/// reduction performed by the store.
#[derive(Debug, Default)]
pub struct SimpleLoggerEnhancer {
    log_level: LogLevel,
}

impl SimpleLoggerEnhancer {
    pub fn new() -> Self {
        SimpleLoggerEnhancer {
            log_level: LogLevel::default(),
        }
    }

    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}

struct LoggingReducer<State, Action> {
    reducer: BoxedReducer<State, Action>,
    log_level: LogLevel,
}

impl<State, Action> Reducer<State, Action> for LoggingReducer<State, Action>
where
    State: Debug,
    Action: Debug,
{
    fn reduce(&self, state: Option<&Rc<State>>, action: &Action) -> Reduction<State> {
        let level = log::Level::from(self.log_level);
        log::log!(level, "prev state: {:?}", state);
        log::log!(level, "action: {:?}", action);

        let reduction = self.reducer.reduce(state, action);

        match &reduction {
            Ok(next_state) => log::log!(level, "next state: {:?}", next_state),
            Err(error) => log::log!(level, "reducer failed: {}", error),
        }

        reduction
    }
}

impl<State, Action> StoreEnhancer<State, Action> for SimpleLoggerEnhancer
where
    State: Debug + 'static,
    Action: StoreAction + Debug + 'static,
{
    fn enhance(
        self,
        reducer: BoxedReducer<State, Action>,
        preloaded_state: Option<Rc<State>>,
        create_store: CreateStoreFn<State, Action>,
    ) -> Result<StoreRef<State, Action>> {
        let reducer = LoggingReducer {
            reducer,
            log_level: self.log_level,
        };
        create_store(Box::new(reducer), preloaded_state)
    }
}
