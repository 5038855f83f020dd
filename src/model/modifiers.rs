use bitflags::bitflags;
use std::fmt::{Display, Error as FmtError, Formatter};

bitflags! {
    /// Modifiers on classes and members
    ///
    /// The low bits line up with the JVM access flags [0]. Flags which share a bit in the class
    /// file (`BRIDGE`/`VOLATILE`, `VARARGS`/`TRANSIENT`) are split apart here since one set is
    /// used for every kind of member.
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6-200-A.1
    pub struct Modifiers: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const BRIDGE = 0x1_0000;
        const VARARGS = 0x2_0000;
        const DEFAULT = 0x4_0000;

        const ACCESS = Self::PUBLIC.bits | Self::PROTECTED.bits | Self::PRIVATE.bits;
    }
}

impl Modifiers {
    /// Modifiers which never take part in a comparison, whatever the mode
    pub const NEVER_TRACKED: Modifiers = Modifiers::from_bits_truncate(
        Modifiers::NATIVE.bits
            | Modifiers::SYNCHRONIZED.bits
            | Modifiers::TRANSIENT.bits
            | Modifiers::STRICT.bits
            | Modifiers::SYNTHETIC.bits
            | Modifiers::BRIDGE.bits
            | Modifiers::VARARGS.bits,
    );

    /// Keywords in the order the Java language specification recommends
    const KEYWORDS: [(Modifiers, &'static str); 12] = [
        (Modifiers::PUBLIC, "public"),
        (Modifiers::PROTECTED, "protected"),
        (Modifiers::PRIVATE, "private"),
        (Modifiers::ABSTRACT, "abstract"),
        (Modifiers::STATIC, "static"),
        (Modifiers::FINAL, "final"),
        (Modifiers::TRANSIENT, "transient"),
        (Modifiers::VOLATILE, "volatile"),
        (Modifiers::SYNCHRONIZED, "synchronized"),
        (Modifiers::NATIVE, "native"),
        (Modifiers::STRICT, "strictfp"),
        (Modifiers::DEFAULT, "default"),
    ];
}

/// Renders the source keywords, space separated (kind flags like `interface` are omitted)
impl Display for Modifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        let mut first = true;
        for (flag, keyword) in Modifiers::KEYWORDS.iter() {
            if self.contains(*flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(keyword)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keywords_in_canonical_order() {
        let modifiers = Modifiers::FINAL | Modifiers::STATIC | Modifiers::PUBLIC;
        assert_eq!(modifiers.to_string(), "public static final");
    }

    #[test]
    fn kind_flags_are_not_rendered() {
        let modifiers = Modifiers::PUBLIC | Modifiers::INTERFACE | Modifiers::ABSTRACT;
        assert_eq!(modifiers.to_string(), "public abstract");
    }
}
