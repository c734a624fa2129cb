/*!

A parser and DOM for the save and game files of [Paradox Development
Studio](https://en.wikipedia.org/wiki/Paradox_Development_Studio) titles
(eg: Europa Universalis (EU4), Crusader Kings (CK2), and Hearts of Iron).

The same logical document arrives in three physical shapes: plaintext,
a token-compressed binary form, and either of those inside a zip archive.
All three routes end in the same place, an owned [Value] tree that keeps
what the format actually says: record keys repeat, arrays mix element
types, and dates live on the game's non-leap calendar.

## Features

- ✔ Versatile: handles the plaintext and binary encodings plus zip saves
- ✔ Faithful: duplicate keys, stray empty blocks, hidden binary dates, and
  the other quirks of the format round-trip the way the game wrote them
- ✔ Self-contained: parsing needs no game files beyond an optional token
  dictionary for the binary form

## Quick Start

```rust
use moltke::parse_string;

let tree = parse_string("start=1444.11.11 core=AAA core=BBB manpower=1.500")?;

assert_eq!(tree.get("start")?.as_date()?.year(), 1444);
assert_eq!(tree.get("manpower")?.as_number()?, 1.5);

// Repeated keys are how the format spells collections
let cores: Vec<_> = tree
    .fields("core")
    .map(|x| x.as_str().unwrap().to_string())
    .collect();
assert_eq!(cores, vec!["AAA".to_string(), "BBB".to_string()]);
# Ok::<(), moltke::Error>(())
```

## Binary Data

The binary form identifies fields by 16 bit ids rather than names.
Callers supply the id dictionary; ids missing from it degrade to their
decimal spelling instead of failing the parse, since the community
dictionaries are incomplete by design.

```rust
use moltke::load_binary;
use std::collections::HashMap;

let data = [0x82, 0x2d, 0x01, 0x00, 0x0f, 0x00, 0x03, 0x00, 0x45, 0x4e, 0x47];
let mut dictionary = HashMap::new();
dictionary.insert(0x2d82, "tag");

let tree = load_binary(&data, &dictionary, None)?;
assert_eq!(tree.get("tag")?.as_str()?, "ENG");
# Ok::<(), moltke::Error>(())
```

## Save Files

[load] takes a path along with the pair of headers a game stamps on its
saves (eg: `EU4txt` / `EU4bin`), figures out which encoding it is looking
at, unwraps a zip container when there is one, and hands back the tree.
The token dictionary is built lazily so text saves never pay for it.

```rust,no_run
use moltke::load;
use std::collections::HashMap;

let tree = load(
    "autosave.eu4",
    b"EU4bin",
    b"EU4txt",
    || HashMap::<u16, String>::new(),
)?;
assert!(tree.try_get("date").is_some());
# Ok::<(), moltke::Error>(())
```

## Writing

[save] (and its [to_vec]/[to_string] conveniences) emit the plaintext
form. Parsing what was written yields the original tree back: pair order,
duplicate keys, and all.

*/
#![warn(missing_docs)]

mod ascii;
pub mod binary;
pub(crate) mod data;
mod date;
mod encoding;
mod envelope;
mod errors;
pub(crate) mod reader;
mod scalar;
pub mod text;
mod util;
mod value;

#[doc(inline)]
pub use self::binary::load_binary;
pub use self::date::Date;
pub use self::encoding::Windows1252Encoding;
pub use self::envelope::{load, load_slice};
pub use self::errors::{Error, ErrorKind};
pub use self::scalar::{Scalar, ScalarError};
#[doc(inline)]
pub use self::text::{parse_string, parse_text, save, to_string, to_vec};
pub use self::value::{Rgb, Value};
