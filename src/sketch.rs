use std::fmt::Write;

/// Knobs for the generated Digispark sketch.
pub struct SketchOptions {
    /// Delay before the first replay, ms.
    pub init_delay: u32,
    /// How many times the payload is replayed.
    pub loop_count: u32,
    /// Delay between replays, ms.
    pub loop_delay: u32,
    /// Blink the on-board LEDs once the replays are done.
    pub blink: bool,
}

impl Default for SketchOptions {
    fn default() -> SketchOptions {
        SketchOptions { init_delay: 2500, loop_count: 1, loop_delay: 5000, blink: true }
    }
}

/// Wrap a payload in a DigiKeyboard sketch. The payload lands in a
/// PROGMEM array the firmware walks two bytes at a time, treating a
/// zero key byte as a delay chunk.
pub fn generate(payload: &[u8], options: &SketchOptions) -> String {
    let mut source = String::new();

    source.push_str("/*\n * Sketch generated by quackenc\n */\n");
    source.push_str("#include \"DigiKeyboard.h\"\n");

    let _ = writeln!(source, "#define DUCK_LEN {}", payload.len());
    source.push_str("const PROGMEM uint8_t duckraw [DUCK_LEN] = {");
    for (i, byte) in payload.iter().enumerate() {
        if i % 12 == 0 {
            source.push_str("\n\t");
        }
        let _ = write!(source, "{:#x}", byte);
        if i + 1 < payload.len() {
            source.push_str(", ");
        }
    }
    source.push_str("\n};\n");
    let _ = writeln!(source, "int i = {};", options.loop_count);
    let _ = writeln!(source, "bool blink = {};", options.blink);

    let _ = write!(
        source,
        "\nvoid setup()\n{{\n\
         \tpinMode(0, OUTPUT); // LED on Model B\n\
         \tpinMode(1, OUTPUT); // LED on Model A\n\
         \tDigiKeyboard.delay({});\n\
         }}\n",
        options.init_delay
    );

    let _ = write!(
        source,
        "void loop()\n{{\n\
         \tif (i != 0) {{\n\
         \t\tDigiKeyboard.sendKeyStroke(0);\n\
         \t\tfor (int j = 0; j < DUCK_LEN; j += 2)\n\
         \t\t{{\n\
         \t\t\tuint8_t key = pgm_read_word_near(duckraw + j);\n\
         \t\t\tuint8_t mod = pgm_read_word_near(duckraw + j + 1);\n\
         \t\t\tif (key == 0) {{\n\
         \t\t\t\tDigiKeyboard.delay(mod);\n\
         \t\t\t}} else {{\n\
         \t\t\t\tDigiKeyboard.sendKeyStroke(key, mod);\n\
         \t\t\t}}\n\
         \t\t}}\n\
         \t\ti--;\n\
         \t\tDigiKeyboard.delay({});\n\
         \t}}\n\
         \telse if (blink)\n\
         \t{{\n\
         \t\tdigitalWrite(0, HIGH);\n\
         \t\tdigitalWrite(1, HIGH);\n\
         \t\tdelay(100);\n\
         \t\tdigitalWrite(0, LOW);\n\
         \t\tdigitalWrite(1, LOW);\n\
         \t\tdelay(100);\n\
         \t}}\n\
         }}\n",
        options.loop_delay
    );

    source
}
