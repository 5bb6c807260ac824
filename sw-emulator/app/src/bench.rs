/*++

Licensed under the Apache-2.0 license.

File Name:

    bench.rs

Abstract:

    File contains the bounded performance loop: a chain of block operations
    where each output is the next input.

--*/

use crate::cli::{ArgsEngine, ArgsMode, BenchArgs};
use crate::session::Session;
use khazad_drivers::{
    Block, BlockCipherEngine, Chain, CipherKey, Direction, IvSource, KeySource, KhazadAccel,
    KhazadResult, ModeSelect, SoftKhazad,
};
use std::time::{Duration, Instant};
use ureg::{Mmio, MmioMut};

const BENCH_KEY: CipherKey = CipherKey::new([0x0001_0203, 0x0405_0607, 0x0809_0a0b, 0x0c0d_0e0f]);
const BENCH_IV: Block = Block::new([0x0001_0203, 0x0405_0607]);

#[derive(Debug)]
pub(crate) struct BenchResult {
    pub ops: u32,
    pub elapsed: Duration,

    /// Emulated accelerator cycles; zero for the software engine
    pub cycles: u64,

    /// Output of the last operation
    pub last: Block,
}

pub(crate) fn run(session: &mut Session, args: &BenchArgs) -> anyhow::Result<BenchResult> {
    log::info!(
        "Benchmark: {:?} {:?} {:?}, {} operations{}",
        args.engine,
        args.mode,
        args.direction,
        args.ops,
        if args.rekey { ", key loaded every time" } else { "" }
    );
    let start_cycles = session.cycles();
    let start = Instant::now();
    let result = match args.engine {
        ArgsEngine::Hw => bench_hw(session.hw().accel_mut(), args),
        ArgsEngine::Sw => bench_sw(session.sw(), args),
    };
    let elapsed = start.elapsed();
    if result.is_err() {
        session.recover();
    }
    let last = result?;
    Ok(BenchResult {
        ops: args.ops,
        elapsed,
        cycles: session.cycles() - start_cycles,
        last,
    })
}

/// Drive the channel directly so `--rekey` really reloads the key.
fn bench_hw<TMmio: Mmio + MmioMut>(
    accel: &mut KhazadAccel<TMmio>,
    args: &BenchArgs,
) -> KhazadResult<Block> {
    let direction = Direction::from(args.direction);
    let mut block = Block::default();
    for op in 0..args.ops {
        let fresh = op == 0 || args.rekey;
        let key = if fresh {
            KeySource::Load(&BENCH_KEY)
        } else {
            KeySource::Reuse
        };
        let mode = match args.mode {
            ArgsMode::Ecb => ModeSelect::Ecb,
            ArgsMode::Cbc if fresh => ModeSelect::Cbc(Chain::Fresh(IvSource::Load(&BENCH_IV))),
            ArgsMode::Cbc => ModeSelect::Cbc(Chain::Continuing),
        };
        block = accel.submit(&block, key, mode, direction)?;
    }
    Ok(block)
}

fn bench_sw(sw: &mut SoftKhazad, args: &BenchArgs) -> KhazadResult<Block> {
    let direction = Direction::from(args.direction);
    let mut block = Block::default();
    let mut chain = BENCH_IV;
    sw.load_key(&BENCH_KEY)?;
    for _ in 0..args.ops {
        if args.rekey {
            sw.load_key(&BENCH_KEY)?;
            chain = BENCH_IV;
        }
        block = match (args.mode, direction) {
            (ArgsMode::Ecb, Direction::Encrypt) => sw.encrypt_block(&block)?,
            (ArgsMode::Ecb, Direction::Decrypt) => sw.decrypt_block(&block)?,
            (ArgsMode::Cbc, Direction::Encrypt) => {
                chain = sw.encrypt_block(&(block ^ chain))?;
                chain
            }
            (ArgsMode::Cbc, Direction::Decrypt) => {
                let out = sw.decrypt_block(&block)? ^ chain;
                chain = block;
                out
            }
        };
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ArgsDirection;
    use crate::config::EmuConfig;

    fn args(engine: ArgsEngine, mode: ArgsMode, direction: ArgsDirection, rekey: bool) -> BenchArgs {
        BenchArgs {
            engine,
            mode,
            direction,
            rekey,
            ops: 16,
        }
    }

    #[test]
    fn test_engines_agree() {
        let mut session = Session::new(EmuConfig::default()).unwrap();
        for mode in [ArgsMode::Ecb, ArgsMode::Cbc] {
            for direction in [ArgsDirection::Encrypt, ArgsDirection::Decrypt] {
                for rekey in [false, true] {
                    let hw = run(&mut session, &args(ArgsEngine::Hw, mode, direction, rekey))
                        .unwrap();
                    let sw = run(&mut session, &args(ArgsEngine::Sw, mode, direction, rekey))
                        .unwrap();
                    assert_eq!(hw.last, sw.last, "{mode:?} {direction:?} rekey={rekey}");
                    assert_eq!(sw.cycles, 0);
                }
            }
        }
    }

    #[test]
    fn test_key_reuse_saves_cycles() {
        let mut session = Session::new(EmuConfig::default()).unwrap();
        let reuse = run(
            &mut session,
            &args(ArgsEngine::Hw, ArgsMode::Ecb, ArgsDirection::Encrypt, false),
        )
        .unwrap();
        let rekey = run(
            &mut session,
            &args(ArgsEngine::Hw, ArgsMode::Ecb, ArgsDirection::Encrypt, true),
        )
        .unwrap();
        assert_eq!(reuse.ops, 16);
        // Each reload costs the key schedule plus four register writes.
        assert_eq!(rekey.cycles - reuse.cycles, 15 * (18 + 4));
    }

    #[test]
    fn test_zero_ops() {
        let mut session = Session::new(EmuConfig::default()).unwrap();
        let mut bench = args(ArgsEngine::Hw, ArgsMode::Cbc, ArgsDirection::Encrypt, false);
        bench.ops = 0;
        let result = run(&mut session, &bench).unwrap();
        assert_eq!(result.cycles, 0);
        assert_eq!(result.last, Block::default());
    }
}
