use rand::Rng;

use super::{Chip8, Chip8Error, Chip8Result, KeyWait, Opcode, OpcodeALU, font};
use crate::u4;

impl Chip8 {
    /// Applies one decoded instruction located at `pc`.
    ///
    /// The program counter is advanced before dispatch, so jumps and calls
    /// overwrite the advanced value. Errors are raised before any other state
    /// changes; the caller rewinds the program counter.
    pub(crate) fn execute(&mut self, pc: u16, opcode: Opcode) -> Result<Chip8Result, Chip8Error> {
        self.registers.advance_pc();

        match opcode {
            Opcode::ClearDisplay => {
                self.framebuffer.clear();
            }
            Opcode::Jump { nnn } => {
                self.registers.set_pc(nnn);
            }
            Opcode::JumpWithOffset { x, nnn } => {
                let offset = if self.quirks.jump_with_vx {
                    self.registers.v[x]
                } else {
                    self.registers.v[0]
                };
                self.registers.set_pc(nnn.wrapping_add(offset.into()));
            }
            Opcode::Call { nnn } => {
                self.stack
                    .push(self.registers.pc())
                    .map_err(|_| Chip8Error::StackOverflow { pc })?;
                self.registers.set_pc(nnn);
            }
            Opcode::Return => {
                let addr = self.stack.pop().ok_or(Chip8Error::StackUnderflow { pc })?;
                self.registers.set_pc(addr);
            }
            Opcode::SkipRegEqualImm { x, nn } => {
                self.skip_if(self.registers.v[x] == nn);
            }
            Opcode::SkipRegNotEqualImm { x, nn } => {
                self.skip_if(self.registers.v[x] != nn);
            }
            Opcode::SkipRegEqualReg { x, y } => {
                self.skip_if(self.registers.v[x] == self.registers.v[y]);
            }
            Opcode::SkipRegNotEqualReg { x, y } => {
                self.skip_if(self.registers.v[x] != self.registers.v[y]);
            }
            Opcode::SetRegImm { x, nn } => {
                self.registers.v[x] = nn;
            }
            Opcode::AddRegImm { x, nn } => {
                self.registers.v[x] = self.registers.v[x].wrapping_add(nn);
            }
            Opcode::ALU { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Random { x, nn } => {
                let rand_byte: u8 = self.rng.random();
                self.registers.v[x] = rand_byte & nn;
            }
            Opcode::SetIndexImm { nnn } => {
                self.registers.set_i(nnn);
            }
            Opcode::AddIndexReg { x } => {
                let i = self.registers.i().wrapping_add(self.registers.v[x].into());
                self.registers.set_i(i);
            }
            Opcode::Draw { x, y, n } => {
                return Ok(self.execute_draw(x, y, n));
            }
            Opcode::SkipIfPressed { x } => {
                let key = u4::from_low_bits(self.registers.v[x]);
                self.skip_if(self.keypad.is_pressed(key));
            }
            Opcode::SkipIfNotPressed { x } => {
                let key = u4::from_low_bits(self.registers.v[x]);
                self.skip_if(!self.keypad.is_pressed(key));
            }
            Opcode::WaitForKey { x } => {
                self.key_wait = Some(KeyWait { x, pressed: None });
                return Ok(self.poll_key_wait());
            }
            Opcode::ReadDelayTimer { x } => {
                self.registers.v[x] = self.timers.delay();
            }
            Opcode::SetDelayTimer { x } => {
                self.timers.set_delay(self.registers.v[x]);
            }
            Opcode::SetSoundTimer { x } => {
                self.timers.set_sound(self.registers.v[x]);
            }
            Opcode::FontChar { x } => {
                self.registers.set_i(font::glyph_address(self.registers.v[x]));
            }
            Opcode::BCD { x } => {
                let value = self.registers.v[x];
                let i = self.registers.i();
                self.memory.write(i, value / 100);
                self.memory.write(i.wrapping_add(1), (value / 10) % 10);
                self.memory.write(i.wrapping_add(2), value % 10);
            }
            Opcode::StoreRegs { x } => {
                let i = self.registers.i();
                for reg_index in 0..=u8::from(x) {
                    self.memory.write(
                        i.wrapping_add(reg_index.into()),
                        self.registers.v[usize::from(reg_index)],
                    );
                }
                self.finish_load_store(x);
            }
            Opcode::LoadRegs { x } => {
                let i = self.registers.i();
                for reg_index in 0..=u8::from(x) {
                    self.registers.v[usize::from(reg_index)] =
                        self.memory.read(i.wrapping_add(reg_index.into()));
                }
                self.finish_load_store(x);
            }
            Opcode::Unknown(opcode) => {
                return Err(Chip8Error::UnknownOpcode { opcode, pc });
            }
        };

        Ok(Chip8Result::Continue)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.advance_pc();
        }
    }

    fn finish_load_store(&mut self, x: u4) {
        if self.quirks.load_store_increments_index {
            let i = self.registers.i().wrapping_add(u16::from(u8::from(x)) + 1);
            self.registers.set_i(i);
        }
    }

    fn execute_alu(&mut self, x: u4, y: u4, op: OpcodeALU) {
        let v = &mut self.registers.v;
        match op {
            OpcodeALU::Set => v[x] = v[y],
            OpcodeALU::Or => {
                v[x] |= v[y];
                if self.quirks.logic_resets_vf {
                    v[0xF] = 0;
                }
            }
            OpcodeALU::And => {
                v[x] &= v[y];
                if self.quirks.logic_resets_vf {
                    v[0xF] = 0;
                }
            }
            OpcodeALU::Xor => {
                v[x] ^= v[y];
                if self.quirks.logic_resets_vf {
                    v[0xF] = 0;
                }
            }
            OpcodeALU::Add => {
                let (res, overflow) = v[x].overflowing_add(v[y]);
                v[x] = res;
                v[0xF] = u8::from(overflow);
            }
            OpcodeALU::Sub => {
                let (res, borrow) = v[x].overflowing_sub(v[y]);
                v[x] = res;
                v[0xF] = u8::from(!borrow); // Notice that borrow is inverted
            }
            OpcodeALU::SubReverse => {
                let (res, borrow) = v[y].overflowing_sub(v[x]);
                v[x] = res;
                v[0xF] = u8::from(!borrow);
            }
            OpcodeALU::ShiftRight => {
                let src = if self.quirks.shift_uses_vy { v[y] } else { v[x] };
                v[x] = src >> 1;
                v[0xF] = src & 1;
            }
            OpcodeALU::ShiftLeft => {
                let src = if self.quirks.shift_uses_vy { v[y] } else { v[x] };
                v[x] = src << 1;
                v[0xF] = src >> 7;
            }
        }
    }

    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> Chip8Result {
        let x_pos = usize::from(self.registers.v[x]);
        let y_pos = usize::from(self.registers.v[y]);
        let sprite = self.memory.read_wrapping(self.registers.i(), n.into());

        let any_erased = if self.quirks.clip_sprites {
            self.framebuffer.draw_sprite_clipped(x_pos, y_pos, &sprite)
        } else {
            self.framebuffer.draw_sprite(x_pos, y_pos, &sprite)
        };

        if self.quirks.draw_resets_vf || any_erased {
            self.registers.set_flag(any_erased);
        }

        if self.quirks.display_wait {
            Chip8Result::WaitForNextFrame
        } else {
            Chip8Result::Continue
        }
    }

    /// Advances a pending FX0A. The key is latched on press and delivered on release.
    pub(crate) fn poll_key_wait(&mut self) -> Chip8Result {
        let Some(wait) = self.key_wait.as_mut() else {
            return Chip8Result::Continue;
        };

        match wait.pressed {
            Some(key) if !self.keypad.is_pressed(key) => {
                // The key we were waiting for has been released
                self.registers.v[wait.x] = key.get();
                self.key_wait = None;
                return Chip8Result::Continue;
            }
            Some(_) => {}
            None => wait.pressed = self.keypad.first_pressed(),
        }

        Chip8Result::AwaitingKey
    }
}
