use super::Engine;
use crate::stage::StageId;

type StageFn = Box<dyn Fn(&str) -> String + Send + Sync>;
type InputSink = Box<dyn Fn(&str) + Send + Sync>;

/// Engine built from one function per stage export.
///
/// This is how a host binds an in-process engine module: each export is
/// wrapped as a plain `&str -> String` function.
pub struct FnEngine {
    tokenize: StageFn,
    parse: StageFn,
    lower_ir: StageFn,
    optimize_ir: StageFn,
    generate: StageFn,
    user_input: InputSink,
}

impl FnEngine {
    pub fn new(
        tokenize: impl Fn(&str) -> String + Send + Sync + 'static,
        parse: impl Fn(&str) -> String + Send + Sync + 'static,
        lower_ir: impl Fn(&str) -> String + Send + Sync + 'static,
        optimize_ir: impl Fn(&str) -> String + Send + Sync + 'static,
        generate: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            tokenize: Box::new(tokenize),
            parse: Box::new(parse),
            lower_ir: Box::new(lower_ir),
            optimize_ir: Box::new(optimize_ir),
            generate: Box::new(generate),
            user_input: Box::new(|_| {}),
        }
    }

    /// Receive the text passed to `set_user_input`
    pub fn with_user_input_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.user_input = Box::new(sink);
        self
    }
}

impl Engine for FnEngine {
    fn invoke(&self, stage: StageId, input: &str) -> String {
        match stage {
            StageId::Tokenize => (self.tokenize)(input),
            StageId::Parse => (self.parse)(input),
            StageId::LowerIR => (self.lower_ir)(input),
            StageId::OptimizeIR => (self.optimize_ir)(input),
            StageId::Generate => (self.generate)(input),
        }
    }

    fn set_user_input(&self, text: &str) {
        (self.user_input)(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_user_input_sink() {
        let received = Arc::new(Mutex::new(String::new()));
        let sink = received.clone();
        let engine = FnEngine::new(
            |s| s.to_string(),
            |s| s.to_string(),
            |s| s.to_string(),
            |s| s.to_string(),
            |s| s.to_string(),
        )
        .with_user_input_sink(move |text| *sink.lock() = text.to_string());

        engine.set_user_input("7 8");
        assert_eq!(*received.lock(), "7 8");
        assert_eq!(engine.invoke(StageId::Generate, "ret i32 42"), "ret i32 42");
    }
}
