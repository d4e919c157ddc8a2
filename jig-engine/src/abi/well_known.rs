use crate::types::*;
use lazy_static::lazy_static;

/// Runtime id of `ArrayBuffer` blocks.
pub const BUF_RTID: u32 = 1;
/// Runtime id of `string` blocks.
pub const STRING_RTID: u32 = 2;

pub const OUTPUT_TYPE_NAME: &str = "Output";
pub const LOCK_TYPE_NAME: &str = "Lock";
pub const JIG_INIT_PARAMS_TYPE_NAME: &str = "JigInitParams";
pub const BASIC_JIG_TYPE_NAME: &str = "__Jig";
pub const BIG_INT_TYPE_NAME: &str = "BigInt";

/// Class pointer handed to a jig under construction. `jig_link` tells the real one.
pub const CLASS_PTR_PLACEHOLDER: Pointer = Pointer::new([0xff; 32], 0xffff);

fn field(name: &str, ty: &str) -> FieldNode {
    FieldNode {
        name: name.to_string(),
        ty: TypeNode::simple(ty),
    }
}

fn object(name: &str, fields: Vec<FieldNode>) -> ObjectNode {
    ObjectNode {
        name: name.to_string(),
        fields,
    }
}

lazy_static! {
    /// Plain objects every package knows about, appended to the exports of every ABI.
    pub static ref WELL_KNOWN_OBJECTS: Vec<ObjectNode> = vec![
        object(
            OUTPUT_TYPE_NAME,
            vec![
                field("origin", "ArrayBuffer"),
                field("location", "ArrayBuffer"),
                field("classPtr", "ArrayBuffer"),
            ],
        ),
        object(
            JIG_INIT_PARAMS_TYPE_NAME,
            vec![
                field("origin", "ArrayBuffer"),
                field("location", "ArrayBuffer"),
                field("classPtr", "ArrayBuffer"),
                field("lockType", "u8"),
                field("lockData", "ArrayBuffer"),
            ],
        ),
        object(
            LOCK_TYPE_NAME,
            vec![
                field("origin", "ArrayBuffer"),
                field("type", "i32"),
                field("data", "ArrayBuffer"),
            ],
        ),
        object(
            BASIC_JIG_TYPE_NAME,
            vec![field("$output", OUTPUT_TYPE_NAME), field("$lock", LOCK_TYPE_NAME)],
        ),
        object(
            BIG_INT_TYPE_NAME,
            vec![field("d", "Uint32Array"), field("n", "i32"), field("isNeg", "bool")],
        ),
    ];

    /// The coin class, imported by every package that doesn't define its own `Coin`.
    pub static ref COIN_IMPORT: ProxyNode = ProxyNode {
        name: COIN_CLASS_NAME.to_string(),
        pkg: hex::encode(COIN_PACKAGE_ID),
    };

    /// Fields every jig starts with.
    pub static ref BASE_JIG_FIELDS: Vec<FieldNode> = vec![
        field("$output", OUTPUT_TYPE_NAME),
        field("$lock", LOCK_TYPE_NAME),
    ];
}

pub fn buffer_type() -> TypeNode {
    TypeNode::simple("ArrayBuffer")
}

pub fn output_type() -> TypeNode {
    TypeNode::simple(OUTPUT_TYPE_NAME)
}

pub fn jig_init_params_type() -> TypeNode {
    TypeNode::simple(JIG_INIT_PARAMS_TYPE_NAME)
}
