use std::collections::{BTreeMap, VecDeque};

use alloy_primitives::{Address, Bytes};

use crate::{
    catena_precompiles, CatenaSpecId, CodeInfo, ExecutionEnvironment, PrecompileError, Substate,
    Tracer, VirtualMachine, WorldState,
};

/// A scriptable virtual machine for testing the executor.
///
/// Responses are consumed in FIFO order; when the queue is empty a run succeeds without
/// spending any gas beyond the intrinsic cost. Calls targeting a precompile address are routed
/// to the native routine instead, mirroring how a real interpreter dispatches them.
#[derive(Debug, Default)]
pub struct MockVm {
    responses: VecDeque<Substate>,
    code: BTreeMap<Address, Bytes>,
    calls: Vec<ExecutionEnvironment>,
}

impl MockVm {
    /// Queues a response for the next non-precompile run.
    pub fn push_response(&mut self, substate: Substate) {
        self.responses.push_back(substate);
    }

    /// Queues a response for the next non-precompile run.
    pub fn with_response(mut self, substate: Substate) -> Self {
        self.push_response(substate);
        self
    }

    /// Registers code served by [`VirtualMachine::get_cached_code`].
    pub fn with_code(mut self, address: Address, code: Bytes) -> Self {
        self.code.insert(address, code);
        self
    }

    /// The environments of every run, in call order.
    pub fn calls(&self) -> &[ExecutionEnvironment] {
        &self.calls
    }
}

impl VirtualMachine for MockVm {
    fn run(
        &mut self,
        entry_gas: u64,
        env: &ExecutionEnvironment,
        _state: &mut dyn WorldState,
        _tracer: &mut dyn Tracer,
    ) -> Substate {
        self.calls.push(env.clone());

        if let Some(precompile) = catena_precompiles().get(&env.recipient) {
            return match precompile(&env.input_data, entry_gas) {
                Ok(result) => Substate {
                    output: result.output,
                    gas_remaining: entry_gas - result.gas_used,
                    ..Default::default()
                },
                Err(PrecompileError::OutOfGas) => Substate::error(),
            };
        }

        self.responses.pop_front().unwrap_or_else(|| Substate::success(entry_gas))
    }

    fn get_cached_code(
        &mut self,
        _state: &mut dyn WorldState,
        address: Address,
        _spec: CatenaSpecId,
    ) -> CodeInfo {
        CodeInfo::new(self.code.get(&address).cloned().unwrap_or_default())
    }
}
